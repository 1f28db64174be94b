use std::path::PathBuf;

use crate::app_config::{AppConfig, API_KEY_VAR};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The API key is optional here: only network commands need it, and they
/// enforce it through [`AppConfig::require_api_key`].
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
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

    let google_api_key = lookup(API_KEY_VAR)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty());

    let data_path = PathBuf::from(or_default(
        "ADBOWL_DATA_PATH",
        "./docs/data/video-ids.json",
    ));
    let rules_path = PathBuf::from(or_default("ADBOWL_RULES_PATH", "./config/refresh.yaml"));
    let log_level = or_default("ADBOWL_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("ADBOWL_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ADBOWL_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let user_agent = or_default("ADBOWL_USER_AGENT", "adbowl/0.1 (ad-discovery)");
    let youtube_base_url = or_default(
        "ADBOWL_YOUTUBE_BASE_URL",
        "https://www.googleapis.com/youtube/v3/",
    );

    Ok(AppConfig {
        google_api_key,
        data_path,
        rules_path,
        log_level,
        request_timeout_secs,
        user_agent,
        youtube_base_url,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
