//! HTTP client for the `YouTube` Data API v3.
//!
//! Wraps `reqwest` with API key handling, typed response deserialization and
//! quota detection. Requests are issued one at a time; there is no retry.

use std::time::Duration;

use adbowl_core::{SearchHit, MAX_RESULTS_CEILING};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, StatusCode, Url};

use crate::error::YoutubeError;
use crate::types::{ApiErrorEnvelope, SearchListResponse, VideoListResponse, VideoStats};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// The `videos` endpoint accepts at most this many ids per call.
pub const MAX_IDS_PER_REQUEST: usize = 50;

/// `YouTube` video ids are 11 characters from the URL-safe base64 alphabet.
#[must_use]
pub fn is_valid_video_id(id: &str) -> bool {
    id.len() == 11
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Client for the `YouTube` Data API.
///
/// Use [`YoutubeClient::new`] for production or
/// [`YoutubeClient::with_base_url`] to point at a mock server in tests.
pub struct YoutubeClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl YoutubeClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, YoutubeError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`YoutubeError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, YoutubeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so `join("search")` appends a segment
        // instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| YoutubeError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Runs one `search.list` call for videos ordered by view count.
    ///
    /// `max_results` is clamped to the API ceiling of 50. Results that are not
    /// videos (no `id.videoId`) are dropped.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::QuotaExceeded`] on a 403 quota response.
    /// - [`YoutubeError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`YoutubeError::Http`] on network failure.
    /// - [`YoutubeError::Deserialize`] if the body has an unexpected shape.
    pub async fn search_videos(
        &self,
        query: &str,
        max_results: u32,
        published_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<SearchHit>, YoutubeError> {
        let max_results = max_results.clamp(1, MAX_RESULTS_CEILING).to_string();
        let published_after =
            published_after.map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true));

        let mut params = vec![
            ("part", "snippet"),
            ("q", query),
            ("type", "video"),
            ("maxResults", max_results.as_str()),
            ("order", "viewCount"),
        ];
        if let Some(cutoff) = published_after.as_deref() {
            params.push(("publishedAfter", cutoff));
        }

        let url = self.build_url("search", &params)?;
        let context = format!("search(q={query})");
        let body = self.request_json(&url, &context).await?;

        let response: SearchListResponse =
            serde_json::from_value(body).map_err(|e| YoutubeError::Deserialize {
                context: context.clone(),
                source: e,
            })?;

        let hits = response
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id.filter(|id| !id.is_empty())?;
                let snippet = item.snippet?;
                Some(SearchHit {
                    video_id,
                    channel_title: snippet.channel_title,
                    title: snippet.title,
                })
            })
            .collect();

        Ok(hits)
    }

    /// Fetches snippet and statistics for up to 50 videos.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::InvalidVideoId`] if any id is malformed.
    /// - [`YoutubeError::TooManyIds`] for more than [`MAX_IDS_PER_REQUEST`] ids.
    /// - Otherwise as for [`YoutubeClient::search_videos`].
    pub async fn video_stats(&self, ids: &[&str]) -> Result<Vec<VideoStats>, YoutubeError> {
        if ids.len() > MAX_IDS_PER_REQUEST {
            return Err(YoutubeError::TooManyIds {
                count: ids.len(),
                max: MAX_IDS_PER_REQUEST,
            });
        }
        if let Some(bad) = ids.iter().find(|id| !is_valid_video_id(id)) {
            return Err(YoutubeError::InvalidVideoId((*bad).to_string()));
        }
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids.join(",");
        let url = self.build_url(
            "videos",
            &[("part", "snippet,statistics"), ("id", joined.as_str())],
        )?;
        let context = format!("videos(count={})", ids.len());
        let body = self.request_json(&url, &context).await?;

        let response: VideoListResponse =
            serde_json::from_value(body).map_err(|e| YoutubeError::Deserialize {
                context,
                source: e,
            })?;

        Ok(response.items.into_iter().map(VideoStats::from).collect())
    }

    /// Fetches statistics for any number of ids, one batch of 50 at a time.
    ///
    /// # Errors
    ///
    /// Stops at the first failing batch; see [`YoutubeClient::video_stats`].
    pub async fn video_stats_batched(
        &self,
        ids: &[&str],
    ) -> Result<Vec<VideoStats>, YoutubeError> {
        let mut stats = Vec::with_capacity(ids.len());
        for (index, chunk) in ids.chunks(MAX_IDS_PER_REQUEST).enumerate() {
            tracing::debug!(batch = index + 1, size = chunk.len(), "fetching video stats");
            stats.extend(self.video_stats(chunk).await?);
        }
        Ok(stats)
    }

    /// Builds `{base}/{endpoint}?{params}&key=...` with percent-encoded values.
    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, YoutubeError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| YoutubeError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    /// Sends a GET and parses the body as JSON, mapping non-2xx statuses to
    /// typed errors.
    async fn request_json(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<serde_json::Value, YoutubeError> {
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Self::status_error(status, context, &body));
        }

        serde_json::from_str(&body).map_err(|e| YoutubeError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }

    fn status_error(status: StatusCode, context: &str, body: &str) -> YoutubeError {
        let envelope = serde_json::from_str::<ApiErrorEnvelope>(body).ok();

        if status == StatusCode::FORBIDDEN {
            let quota = envelope.as_ref().is_some_and(|env| {
                env.error
                    .errors
                    .iter()
                    .any(|detail| detail.reason.as_deref() == Some("quotaExceeded"))
            });
            if quota {
                return YoutubeError::QuotaExceeded;
            }
        }

        let message = envelope
            .and_then(|env| env.error.message)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "unknown error".to_string());

        YoutubeError::UnexpectedStatus {
            status: status.as_u16(),
            context: context.to_string(),
            message,
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
