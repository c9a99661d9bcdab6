//! Facebook Graph client and the page-insights orchestration built on it.
//!
//! [`SessionAuthenticator`] runs the consent step and loads the user's pages
//! and profile; [`InsightsFetcher`] fans out one request per [`Metric`] and
//! joins them into an [`InsightsResult`]. Both are written against the
//! [`GraphPlatform`] trait, implemented for the live API by [`GraphClient`].
//!
//! [`Metric`]: pageinsights_core::Metric

pub mod auth;
pub mod client;
pub mod error;
pub mod insights;
pub mod platform;
pub mod session;
pub mod types;

pub use auth::{LoginOutcome, SessionAuthenticator};
pub use client::GraphClient;
pub use error::{AuthError, GraphError, InsightsError, SessionError};
pub use insights::{
    get_insight_value, resolve_window, FetchKey, FetchOutcome, FetchStatus, InsightsFetcher,
    InsightsResult, InsightsSnapshot, MetricValue, ResolvedWindow, NOT_AVAILABLE,
    PERIOD_TOTAL_OVER_RANGE,
};
pub use platform::{AuthResult, GraphPlatform, LOGIN_SCOPE};
pub use session::{Session, SessionState};
