//! Typed client for the `YouTube` Data API v3 endpoints adbowl uses:
//! `search` for discovering candidate ads and `videos` for view statistics.

pub mod client;
pub mod error;
pub mod types;

pub use client::{is_valid_video_id, YoutubeClient, MAX_IDS_PER_REQUEST};
pub use error::YoutubeError;
pub use types::VideoStats;
