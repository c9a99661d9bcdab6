use pageinsights_core::Metric;
use thiserror::Error;

/// Transport-level errors returned by a [`GraphPlatform`](crate::GraphPlatform).
#[derive(Debug, Error)]
pub enum GraphError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Graph API answered with an error envelope or a non-2xx status.
    #[error("Graph API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Failures of the login step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The user declined consent or cancelled the flow.
    #[error("authentication declined")]
    Declined,

    #[error("page list unavailable: {0}")]
    PageListUnavailable(String),

    #[error("profile unavailable: {0}")]
    ProfileUnavailable(String),

    /// The consent step itself could not reach the provider.
    #[error("authentication transport failure: {0}")]
    Transport(String),
}

/// Failures of an insights fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsightsError {
    /// One of the per-metric requests failed or returned a malformed body.
    #[error("failed to fetch {metric}: {reason}")]
    MetricFetchFailed { metric: Metric, reason: String },
}

/// Errors surfaced by [`Session`](crate::Session) transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("unknown page id: {0}")]
    UnknownPage(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Insights(#[from] InsightsError),
}
