//! Login: consent, then the page list and profile in parallel.

use std::sync::Arc;

use pageinsights_core::{Page, Profile};

use crate::error::AuthError;
use crate::platform::{AuthResult, GraphPlatform};
use crate::types::{AccountsResponse, MeResponse};

const PROFILE_FIELDS: &str = "name,picture,link";

/// Result of a successful consent step.
///
/// The page list and profile are fetched independently; either can be
/// unavailable while the other succeeded.
#[derive(Clone)]
pub struct LoginOutcome {
    pub access_token: String,
    pub pages: Result<Vec<Page>, AuthError>,
    pub profile: Result<Profile, AuthError>,
}

impl std::fmt::Debug for LoginOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginOutcome")
            .field("access_token", &"[redacted]")
            .field("pages", &self.pages)
            .field("profile", &self.profile)
            .finish()
    }
}

pub struct SessionAuthenticator<P: ?Sized> {
    platform: Arc<P>,
}

impl<P: GraphPlatform + ?Sized> SessionAuthenticator<P> {
    pub fn new(platform: Arc<P>) -> Self {
        Self { platform }
    }

    /// Runs the consent flow, then fetches administered pages and the user's
    /// profile concurrently.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Declined`] if the user did not grant access.
    /// - [`AuthError::Transport`] if the consent step itself failed.
    ///
    /// Page-list and profile failures do not fail the login; they are
    /// reported inside [`LoginOutcome`].
    pub async fn login(&self) -> Result<LoginOutcome, AuthError> {
        let access_token = match self.platform.authenticate().await {
            Ok(AuthResult::Granted { access_token }) => access_token,
            Ok(AuthResult::Declined) => {
                tracing::warn!("user cancelled login or did not fully authorize");
                return Err(AuthError::Declined);
            }
            Err(e) => {
                tracing::warn!(error = %e, "consent flow failed");
                return Err(AuthError::Transport(e.to_string()));
            }
        };

        let (pages, profile) = tokio::join!(
            self.fetch_pages(&access_token),
            self.fetch_profile(&access_token)
        );

        match &pages {
            Ok(list) => tracing::info!(count = list.len(), "loaded administered pages"),
            Err(e) => tracing::warn!(error = %e, "page list fetch failed"),
        }
        if let Err(e) = &profile {
            tracing::warn!(error = %e, "profile fetch failed");
        }

        Ok(LoginOutcome {
            access_token,
            pages,
            profile,
        })
    }

    async fn fetch_pages(&self, access_token: &str) -> Result<Vec<Page>, AuthError> {
        let body = self
            .platform
            .call_graph_api("me/accounts", &[("access_token", access_token)])
            .await
            .map_err(|e| AuthError::PageListUnavailable(e.to_string()))?;
        let accounts: AccountsResponse = serde_json::from_value(body)
            .map_err(|e| AuthError::PageListUnavailable(format!("malformed me/accounts: {e}")))?;
        Ok(accounts.data)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<Profile, AuthError> {
        let body = self
            .platform
            .call_graph_api(
                "me",
                &[("fields", PROFILE_FIELDS), ("access_token", access_token)],
            )
            .await
            .map_err(|e| AuthError::ProfileUnavailable(e.to_string()))?;
        let me: MeResponse = serde_json::from_value(body)
            .map_err(|e| AuthError::ProfileUnavailable(format!("malformed me: {e}")))?;
        Ok(me.into())
    }
}
