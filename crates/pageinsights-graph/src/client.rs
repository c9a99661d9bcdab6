//! HTTP client for the Facebook Graph API.
//!
//! Wraps `reqwest` with Graph-specific URL building, error-envelope handling
//! and JSON decoding. Implements [`GraphPlatform`] so the authenticator and
//! insights fetcher can run against the live API.

use std::time::Duration;

use async_trait::async_trait;
use pageinsights_core::{AppConfig, DEFAULT_USER_AGENT};
use reqwest::{Client, Url};

use crate::error::GraphError;
use crate::platform::{AuthResult, GraphPlatform, LOGIN_SCOPE};

const DIALOG_BASE_URL: &str = "https://www.facebook.com/";

/// Client for the Graph REST API.
///
/// Use [`GraphClient::from_app_config`] for production or
/// [`GraphClient::with_base_url`] to point at a mock server in tests.
pub struct GraphClient {
    client: Client,
    app_id: String,
    api_version: String,
    base_url: Url,
    user_access_token: Option<String>,
}

impl GraphClient {
    /// Creates a client from loaded application configuration, including the
    /// user access token when one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Http`] if the HTTP client cannot be built, or
    /// [`GraphError::InvalidBaseUrl`] if the configured base URL is malformed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, GraphError> {
        let client = Self::build(
            &config.app_id,
            &config.graph_api_version,
            config.request_timeout_secs,
            &config.user_agent,
            &config.graph_base_url,
        )?;
        Ok(match &config.user_access_token {
            Some(token) => client.with_user_access_token(token.clone()),
            None => client,
        })
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Http`] if the HTTP client cannot be built, or
    /// [`GraphError::InvalidBaseUrl`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        app_id: &str,
        api_version: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GraphError> {
        Self::build(
            app_id,
            api_version,
            timeout_secs,
            DEFAULT_USER_AGENT,
            base_url,
        )
    }

    fn build(
        app_id: &str,
        api_version: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, GraphError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so `Url::join` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| GraphError::InvalidBaseUrl(format!("'{base_url}': {e}")))?;

        Ok(Self {
            client,
            app_id: app_id.to_owned(),
            api_version: api_version.trim_matches('/').to_owned(),
            base_url,
            user_access_token: None,
        })
    }

    /// Supplies the user access token obtained from the consent flow.
    #[must_use]
    pub fn with_user_access_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.user_access_token = (!token.trim().is_empty()).then_some(token);
        self
    }

    /// Builds the provider consent URL the user visits to grant access.
    ///
    /// The provider redirects to `redirect_uri` with the access token in the
    /// URL fragment (`response_type=token`).
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidBaseUrl`] if the dialog URL cannot be built
    /// from the configured API version.
    pub fn login_dialog_url(&self, redirect_uri: &str) -> Result<Url, GraphError> {
        let mut url = Url::parse(DIALOG_BASE_URL)
            .and_then(|base| base.join(&format!("{}/dialog/oauth", self.api_version)))
            .map_err(|e| GraphError::InvalidBaseUrl(format!("login dialog: {e}")))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.app_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", LOGIN_SCOPE)
            .append_pair("response_type", "token");
        Ok(url)
    }

    /// Builds `<base>/<version>/<path>?<params>` with percent-encoded pairs.
    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, GraphError> {
        let relative = format!("{}/{}", self.api_version, path.trim_start_matches('/'));
        let mut url = self
            .base_url
            .join(&relative)
            .map_err(|e| GraphError::InvalidBaseUrl(format!("path '{path}': {e}")))?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends a GET request and decodes the JSON body, mapping Graph error
    /// envelopes and non-2xx statuses to [`GraphError::Api`].
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, GraphError> {
        // reqwest errors render the request URL, which carries the access token.
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| GraphError::Http(e.without_url()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GraphError::Http(e.without_url()))?;

        let body = match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(GraphError::Api {
                    status: status.as_u16(),
                    message: truncate(&text, 200),
                });
            }
            Err(e) => {
                return Err(GraphError::Deserialize {
                    context: redact_token(url),
                    source: e,
                });
            }
        };

        Self::check_api_error(status.as_u16(), &body)?;
        if !status.is_success() {
            return Err(GraphError::Api {
                status: status.as_u16(),
                message: format!("unexpected HTTP status {status}"),
            });
        }
        Ok(body)
    }

    /// Returns an error if the body carries a Graph `{"error": {...}}` envelope.
    fn check_api_error(status: u16, body: &serde_json::Value) -> Result<(), GraphError> {
        let Some(err) = body.get("error").filter(|e| e.is_object()) else {
            return Ok(());
        };
        let message = err
            .get("message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown error");
        let kind = err.get("type").and_then(serde_json::Value::as_str);
        let code = err.get("code").and_then(serde_json::Value::as_i64);
        let message = match (kind, code) {
            (Some(kind), Some(code)) => format!("{message} (type={kind}, code={code})"),
            (Some(kind), None) => format!("{message} (type={kind})"),
            (None, Some(code)) => format!("{message} (code={code})"),
            (None, None) => message.to_string(),
        };
        Err(GraphError::Api { status, message })
    }
}

#[async_trait]
impl GraphPlatform for GraphClient {
    async fn authenticate(&self) -> Result<AuthResult, GraphError> {
        Ok(match &self.user_access_token {
            Some(token) => AuthResult::Granted {
                access_token: token.clone(),
            },
            None => AuthResult::Declined,
        })
    }

    async fn call_graph_api(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, GraphError> {
        let url = self.build_url(path, params)?;
        tracing::debug!(path, "graph request");
        self.request_json(&url).await
    }
}

/// Renders a URL for error context with the `access_token` value masked.
fn redact_token(url: &Url) -> String {
    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "access_token" {
                "[redacted]".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    if pairs.is_empty() {
        return masked.to_string();
    }
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
