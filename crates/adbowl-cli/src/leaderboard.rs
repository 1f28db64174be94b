//! View-count leaderboard for the ads already in the dataset.

use std::collections::HashMap;
use std::path::Path;

use adbowl_core::{load_dataset, AdRecord, AppConfig, Dataset};
use adbowl_youtube::{is_valid_video_id, VideoStats, YoutubeClient};
use anyhow::Context;
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortMode {
    /// Most viewed first
    Views,
    /// Highest (likes + comments) / views first
    Engagement,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LeaderboardRow {
    pub video_id: String,
    pub brand: String,
    pub ad_title: String,
    pub celebrity: Option<String>,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}

impl LeaderboardRow {
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn engagement_rate(&self) -> f64 {
        if self.views == 0 {
            return 0.0;
        }
        (self.likes + self.comments) as f64 / self.views as f64
    }
}

/// Join dataset records with fetched statistics, in dataset order.
///
/// Records without statistics (removed or private videos) are left out.
pub(crate) fn build_rows(dataset: &Dataset, stats: Vec<VideoStats>) -> Vec<LeaderboardRow> {
    let mut by_id: HashMap<String, VideoStats> =
        stats.into_iter().map(|s| (s.id.clone(), s)).collect();

    dataset
        .ads
        .iter()
        .filter_map(|ad| {
            let Some(stats) = by_id.remove(ad.video_id()) else {
                tracing::debug!(video_id = %ad.video_id(), "no statistics returned; omitting");
                return None;
            };
            Some(LeaderboardRow {
                video_id: ad.video_id().to_string(),
                brand: ad.brand().to_string(),
                ad_title: ad.ad_title().to_string(),
                celebrity: ad.celebrity().map(str::to_string),
                views: stats.view_count,
                likes: stats.like_count,
                comments: stats.comment_count,
            })
        })
        .collect()
}

/// Stable sort, so ties keep dataset order.
pub(crate) fn sort_rows(rows: &mut [LeaderboardRow], mode: SortMode) {
    match mode {
        SortMode::Views => rows.sort_by(|a, b| b.views.cmp(&a.views)),
        SortMode::Engagement => {
            rows.sort_by(|a, b| b.engagement_rate().total_cmp(&a.engagement_rate()));
        }
    }
}

pub(crate) fn render_markdown(event: &str, rows: &[LeaderboardRow], limit: usize) -> String {
    let mut out = format!("# {event} Ad Leaderboard\n\n");

    if rows.is_empty() {
        out.push_str("no ads with statistics\n");
        return out;
    }

    out.push_str("| Rank | Brand | Ad | Celebrity | Views | Likes | Comments | Engagement |\n");
    out.push_str("|------|-------|----|-----------|-------|-------|----------|------------|\n");
    for (index, row) in rows.iter().take(limit).enumerate() {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {:.2}% |\n",
            index + 1,
            escape_cell(&row.brand),
            escape_cell(&row.ad_title),
            row.celebrity.as_deref().map_or("\u{2014}".to_string(), escape_cell),
            row.views,
            row.likes,
            row.comments,
            row.engagement_rate() * 100.0,
        ));
    }
    out
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Fetch statistics for every ad in the dataset and print a ranked table.
///
/// # Errors
///
/// Returns an error if the API key is missing, the dataset cannot be read,
/// or any statistics request fails.
pub(crate) async fn run_leaderboard(
    config: &AppConfig,
    data_path: &Path,
    sort: SortMode,
    limit: usize,
) -> anyhow::Result<()> {
    let api_key = config.require_api_key()?;
    let dataset = load_dataset(data_path)?;

    let ids: Vec<&str> = dataset
        .ads
        .iter()
        .map(AdRecord::video_id)
        .filter(|id| {
            let valid = is_valid_video_id(id);
            if !valid {
                tracing::warn!(video_id = %id, "skipping malformed video id");
            }
            valid
        })
        .collect();

    let client = YoutubeClient::with_base_url(
        api_key,
        config.request_timeout_secs,
        &config.user_agent,
        &config.youtube_base_url,
    )
    .context("failed to build YouTube client")?;

    let stats = client
        .video_stats_batched(&ids)
        .await
        .context("fetching video statistics")?;

    let mut rows = build_rows(&dataset, stats);
    sort_rows(&mut rows, sort);
    print!("{}", render_markdown(&dataset.event, &rows, limit));
    Ok(())
}
