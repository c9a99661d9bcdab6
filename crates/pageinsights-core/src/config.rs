use crate::app_config::{
    AppConfig, DEFAULT_API_VERSION, DEFAULT_GRAPH_BASE_URL, DEFAULT_USER_AGENT,
};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can use a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let app_id = require("FACEBOOK_APP_ID")?;
    let user_access_token = lookup("PAGEINSIGHTS_USER_ACCESS_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());

    let graph_base_url = or_default("PAGEINSIGHTS_GRAPH_BASE_URL", DEFAULT_GRAPH_BASE_URL);
    let graph_api_version = parse_api_version(&or_default(
        "PAGEINSIGHTS_GRAPH_API_VERSION",
        DEFAULT_API_VERSION,
    ))?;

    let request_timeout_secs = parse_u64("PAGEINSIGHTS_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PAGEINSIGHTS_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let user_agent = or_default("PAGEINSIGHTS_USER_AGENT", DEFAULT_USER_AGENT);
    let log_level = or_default("PAGEINSIGHTS_LOG_LEVEL", "info");

    Ok(AppConfig {
        app_id,
        user_access_token,
        graph_base_url,
        graph_api_version,
        request_timeout_secs,
        user_agent,
        log_level,
    })
}

/// Accepts `v<major>.<minor>` (e.g. `v16.0`).
fn parse_api_version(raw: &str) -> Result<String, ConfigError> {
    let valid = raw.strip_prefix('v').is_some_and(|rest| {
        let mut parts = rest.split('.');
        matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(major), Some(minor), None)
                if !major.is_empty()
                    && !minor.is_empty()
                    && major.chars().all(|c| c.is_ascii_digit())
                    && minor.chars().all(|c| c.is_ascii_digit())
        )
    });

    if valid {
        Ok(raw.to_string())
    } else {
        Err(ConfigError::InvalidEnvVar {
            var: "PAGEINSIGHTS_GRAPH_API_VERSION".to_string(),
            reason: format!("expected a version like v16.0, got '{raw}'"),
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
