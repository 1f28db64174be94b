use std::path::PathBuf;

use crate::ConfigError;

pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";

#[derive(Clone)]
pub struct AppConfig {
    pub google_api_key: Option<String>,
    pub data_path: PathBuf,
    pub rules_path: PathBuf,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub youtube_base_url: String,
}

impl AppConfig {
    /// Returns the API key, or the fatal precondition error when it is unset.
    ///
    /// Callers that talk to the network must check this before touching the
    /// dataset file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] naming `GOOGLE_API_KEY`.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.google_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(API_KEY_VAR.to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "google_api_key",
                &self.google_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("data_path", &self.data_path)
            .field("rules_path", &self.rules_path)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("youtube_base_url", &self.youtube_base_url)
            .finish()
    }
}
