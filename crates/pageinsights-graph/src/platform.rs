//! The injected identity and Graph API capability.

use async_trait::async_trait;

use crate::error::GraphError;

/// Consent scope requested at login.
pub const LOGIN_SCOPE: &str =
    "public_profile,email,pages_read_engagement,pages_read_user_content";

/// Outcome of the provider consent step.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthResult {
    Granted { access_token: String },
    Declined,
}

impl std::fmt::Debug for AuthResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthResult::Granted { .. } => f
                .debug_struct("Granted")
                .field("access_token", &"[redacted]")
                .finish(),
            AuthResult::Declined => f.write_str("Declined"),
        }
    }
}

/// Capability surface of the social platform.
///
/// Both the session authenticator and the insights fetcher are written
/// against this trait, so they can run against [`GraphClient`](crate::GraphClient)
/// or an in-memory double.
#[async_trait]
pub trait GraphPlatform: Send + Sync {
    /// Runs the consent flow and returns a user access token if granted.
    async fn authenticate(&self) -> Result<AuthResult, GraphError>;

    /// Issues a GET against `path` (relative, no leading slash required)
    /// with `params` as query pairs and returns the decoded JSON body.
    async fn call_graph_api(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, GraphError>;
}
