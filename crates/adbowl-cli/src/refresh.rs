//! The refresh pipeline: search, classify, merge, persist.
//!
//! A failed query is logged and contributes nothing; the run carries on with
//! the remaining queries. Only a missing API key, bad rules, or an unreadable
//! or unwritable dataset abort the run.

use std::path::{Path, PathBuf};

use adbowl_core::{
    load_dataset, load_rules, merge_candidates, save_dataset, AdRecord, AppConfig, Classifier,
    MergeOutcome, RefreshRules, Rejection, SearchHit, Verdict,
};
use adbowl_youtube::YoutubeClient;
use anyhow::Context;
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub(crate) struct RefreshOptions {
    pub data_path: PathBuf,
    pub rules_path: PathBuf,
    pub dry_run: bool,
}

/// Raw hits returned by one query.
#[derive(Debug)]
pub(crate) struct QueryBatch {
    pub query: String,
    pub hits: Vec<SearchHit>,
    pub error: Option<String>,
}

#[derive(Debug)]
pub(crate) struct RefreshReport {
    pub outcome: MergeOutcome,
    pub added: Vec<AdRecord>,
    pub rejections: Vec<Rejection>,
    pub failed_queries: Vec<String>,
    pub dry_run: bool,
}

/// Run a refresh against the configured API.
///
/// The API key is checked first so a missing credential never reaches the
/// network or the dataset file.
///
/// # Errors
///
/// Returns an error if the API key is missing, the rules are invalid, the
/// client cannot be built, or the dataset cannot be read or written.
pub(crate) async fn run_refresh(
    config: &AppConfig,
    options: &RefreshOptions,
    today: NaiveDate,
) -> anyhow::Result<RefreshReport> {
    let api_key = config.require_api_key()?;

    let rules = load_rules(&options.rules_path)
        .with_context(|| format!("loading rules from {}", options.rules_path.display()))?;
    let classifier = Classifier::from_rules(&rules)?;

    let client = YoutubeClient::with_base_url(
        api_key,
        config.request_timeout_secs,
        &config.user_agent,
        &config.youtube_base_url,
    )
    .context("failed to build YouTube client")?;

    refresh_dataset(
        &client,
        &rules,
        &classifier,
        &options.data_path,
        options.dry_run,
        today,
    )
    .await
}

/// Load the dataset, run every query, and persist any new records.
pub(crate) async fn refresh_dataset(
    client: &YoutubeClient,
    rules: &RefreshRules,
    classifier: &Classifier,
    data_path: &Path,
    dry_run: bool,
    today: NaiveDate,
) -> anyhow::Result<RefreshReport> {
    let mut dataset = load_dataset(data_path)?;
    tracing::info!(existing = dataset.ads.len(), path = %data_path.display(), "loaded dataset");

    let batches = issue_queries(client, rules).await;
    let failed_queries: Vec<String> = batches
        .iter()
        .filter(|b| b.error.is_some())
        .map(|b| b.query.clone())
        .collect();
    if !failed_queries.is_empty() && failed_queries.len() == batches.len() {
        tracing::warn!(
            failed = failed_queries.len(),
            "every query failed; nothing to merge this run"
        );
    }

    let (accepted, rejections) =
        classify_hits(classifier, batches.into_iter().flat_map(|b| b.hits));

    let new_ads = merge_candidates(&dataset.ads, accepted);
    if new_ads.is_empty() {
        tracing::info!("no new ads found");
        return Ok(RefreshReport {
            outcome: MergeOutcome::NothingNew,
            added: Vec::new(),
            rejections,
            failed_queries,
            dry_run,
        });
    }

    for ad in &new_ads {
        tracing::info!(
            video_id = %ad.video_id(),
            brand = %ad.brand(),
            title = %ad.ad_title(),
            "new ad"
        );
    }

    let added = new_ads.clone();
    let total = dataset.ads.len() + new_ads.len();

    if dry_run {
        tracing::info!(added = added.len(), "dry-run: dataset left untouched");
    } else {
        dataset.append(new_ads, today);
        save_dataset(data_path, &dataset)?;
        tracing::info!(
            added = added.len(),
            total,
            path = %data_path.display(),
            "dataset updated"
        );
    }

    Ok(RefreshReport {
        outcome: MergeOutcome::Updated {
            added: added.len(),
            total,
        },
        added,
        rejections,
        failed_queries,
        dry_run,
    })
}

/// Issue every configured query in order. Failures become empty batches.
pub(crate) async fn issue_queries(client: &YoutubeClient, rules: &RefreshRules) -> Vec<QueryBatch> {
    let max_results = rules.effective_max_results();
    let mut batches = Vec::with_capacity(rules.queries.len());

    for query in &rules.queries {
        tracing::info!(query = %query, "searching");
        match client
            .search_videos(query, max_results, rules.published_after)
            .await
        {
            Ok(hits) => {
                tracing::debug!(query = %query, results = hits.len(), "search complete");
                batches.push(QueryBatch {
                    query: query.clone(),
                    hits,
                    error: None,
                });
            }
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "search failed; skipping query");
                batches.push(QueryBatch {
                    query: query.clone(),
                    hits: Vec::new(),
                    error: Some(e.to_string()),
                });
            }
        }
    }

    batches
}

/// Split hits into accepted records and logged rejections, preserving order.
pub(crate) fn classify_hits<I>(classifier: &Classifier, hits: I) -> (Vec<AdRecord>, Vec<Rejection>)
where
    I: IntoIterator<Item = SearchHit>,
{
    let mut accepted = Vec::new();
    let mut rejections = Vec::new();

    for hit in hits {
        match classifier.classify(&hit) {
            Verdict::Accept(record) => accepted.push(record),
            Verdict::Reject(rejection) => {
                tracing::info!(
                    rule = %rejection.reason,
                    channel = %rejection.hit.channel_title,
                    title = %rejection.hit.title,
                    "skipping non-ad result"
                );
                rejections.push(rejection);
            }
        }
    }

    (accepted, rejections)
}

pub(crate) fn print_report(report: &RefreshReport) {
    if report.dry_run && !report.rejections.is_empty() {
        println!("rejected {} results:", report.rejections.len());
        for rejection in &report.rejections {
            println!(
                "  - [{}] {}: {}",
                rejection.reason, rejection.hit.channel_title, rejection.hit.title
            );
        }
    }

    if !report.failed_queries.is_empty() {
        println!(
            "{} queries failed: {}",
            report.failed_queries.len(),
            report.failed_queries.join("; ")
        );
    }

    match report.outcome {
        MergeOutcome::NothingNew => println!("no new ads found"),
        MergeOutcome::Updated { added, total } => {
            let verb = if report.dry_run { "would add" } else { "added" };
            println!("{verb} {added} new ads (total: {total}):");
            for ad in &report.added {
                println!("  + {}: {}", ad.brand(), ad.ad_title());
            }
        }
    }
}

#[cfg(test)]
#[path = "refresh_test.rs"]
mod tests;
