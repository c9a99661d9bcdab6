//! Shared domain types and configuration for `pageinsights`.

mod app_config;
mod config;
pub mod metrics;
pub mod types;

use thiserror::Error;

pub use app_config::{AppConfig, DEFAULT_API_VERSION, DEFAULT_GRAPH_BASE_URL, DEFAULT_USER_AGENT};
pub use config::{load_app_config, load_app_config_from_env};
pub use metrics::Metric;
pub use types::{DateRange, Page, Profile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid calendar date '{input}': expected YYYY-MM-DD")]
    InvalidDate { input: String },
}
