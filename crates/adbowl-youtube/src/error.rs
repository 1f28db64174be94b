use thiserror::Error;

/// Errors returned by the `YouTube` Data API client.
#[derive(Debug, Error)]
pub enum YoutubeError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("YouTube API returned {status} for {context}: {message}")]
    UnexpectedStatus {
        status: u16,
        context: String,
        message: String,
    },

    /// HTTP 403 with reason `quotaExceeded`.
    #[error("YouTube API quota exceeded")]
    QuotaExceeded,

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid video id '{0}'")]
    InvalidVideoId(String),

    #[error("too many video ids: {count} (maximum is {max})")]
    TooManyIds { count: usize, max: usize },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
