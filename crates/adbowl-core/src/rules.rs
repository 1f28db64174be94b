//! Refresh rules: search queries, the publish-date cutoff, and the classifier
//! blocklists. Kept in a YAML file so operators tune false positives without
//! touching code.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;

use crate::ConfigError;

/// Page-size ceiling of the search endpoint.
pub const MAX_RESULTS_CEILING: u32 = 50;

fn default_max_results() -> u32 {
    MAX_RESULTS_CEILING
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRules {
    /// Free-text queries, issued in this order.
    pub queries: Vec<String>,
    #[serde(default = "default_max_results")]
    pub max_results_per_query: u32,
    /// Only videos published on or after this instant are requested.
    #[serde(default)]
    pub published_after: Option<DateTime<Utc>>,
    /// Channel names matched case-insensitively after trimming.
    #[serde(default)]
    pub blocked_channels: Vec<String>,
    /// Regular expressions searched against the lower-cased title.
    #[serde(default)]
    pub blocked_title_patterns: Vec<String>,
}

impl RefreshRules {
    /// Per-query result count, clamped to the endpoint's ceiling.
    #[must_use]
    pub fn effective_max_results(&self) -> u32 {
        self.max_results_per_query.min(MAX_RESULTS_CEILING)
    }
}

/// Normalize a channel name the way the classifier compares them.
#[must_use]
pub fn normalize_channel(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Load and validate the refresh rules from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_rules(path: &Path) -> Result<RefreshRules, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RulesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_rules(&content)
}

/// Parse and validate rules from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` on malformed YAML or invalid rules.
pub fn parse_rules(content: &str) -> Result<RefreshRules, ConfigError> {
    let rules: RefreshRules = serde_yaml::from_str(content)?;
    validate_rules(&rules)?;
    Ok(rules)
}

fn validate_rules(rules: &RefreshRules) -> Result<(), ConfigError> {
    if rules.queries.is_empty() {
        return Err(ConfigError::Validation(
            "at least one search query is required".to_string(),
        ));
    }

    if rules.queries.iter().any(|q| q.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "search queries must be non-empty".to_string(),
        ));
    }

    if rules.max_results_per_query == 0 || rules.max_results_per_query > MAX_RESULTS_CEILING {
        return Err(ConfigError::Validation(format!(
            "max_results_per_query is {}; must be between 1 and {MAX_RESULTS_CEILING}",
            rules.max_results_per_query
        )));
    }

    let mut seen_channels = HashSet::new();
    for channel in &rules.blocked_channels {
        let normalized = normalize_channel(channel);
        if normalized.is_empty() {
            return Err(ConfigError::Validation(
                "blocked channel names must be non-empty".to_string(),
            ));
        }
        if !seen_channels.insert(normalized) {
            return Err(ConfigError::Validation(format!(
                "duplicate blocked channel: '{channel}'"
            )));
        }
    }

    for pattern in &rules.blocked_title_patterns {
        Regex::new(pattern).map_err(|e| {
            ConfigError::Validation(format!("invalid title pattern '{pattern}': {e}"))
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "queries:\n  - Super Bowl LX 2026 commercial\n";

    #[test]
    fn minimal_rules_use_defaults() {
        let rules = parse_rules(MINIMAL).unwrap();
        assert_eq!(rules.queries, vec!["Super Bowl LX 2026 commercial"]);
        assert_eq!(rules.max_results_per_query, 50);
        assert!(rules.published_after.is_none());
        assert!(rules.blocked_channels.is_empty());
        assert!(rules.blocked_title_patterns.is_empty());
    }

    #[test]
    fn parses_published_after() {
        let yaml = format!("{MINIMAL}published_after: \"2026-01-01T00:00:00Z\"\n");
        let rules = parse_rules(&yaml).unwrap();
        let cutoff = rules.published_after.unwrap();
        assert_eq!(cutoff.to_rfc3339(), "2026-01-01T00:00:00+00:00");
    }

    #[test]
    fn rejects_empty_query_list() {
        let err = parse_rules("queries: []\n").unwrap_err();
        assert!(err.to_string().contains("at least one search query"));
    }

    #[test]
    fn rejects_blank_query() {
        let err = parse_rules("queries:\n  - \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn rejects_max_results_above_ceiling() {
        let yaml = format!("{MINIMAL}max_results_per_query: 51\n");
        let err = parse_rules(&yaml).unwrap_err();
        assert!(err.to_string().contains("between 1 and 50"));
    }

    #[test]
    fn rejects_zero_max_results() {
        let yaml = format!("{MINIMAL}max_results_per_query: 0\n");
        assert!(matches!(
            parse_rules(&yaml),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn rejects_duplicate_channels_after_normalizing() {
        let yaml = format!("{MINIMAL}blocked_channels:\n  - NFL\n  - \" nfl \"\n");
        let err = parse_rules(&yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate blocked channel"));
    }

    #[test]
    fn rejects_uncompilable_pattern() {
        let yaml = format!("{MINIMAL}blocked_title_patterns:\n  - \"top\\\\s+(\"\n");
        let err = parse_rules(&yaml).unwrap_err();
        assert!(err.to_string().contains("invalid title pattern"));
    }

    #[test]
    fn effective_max_results_is_clamped() {
        let mut rules = parse_rules(MINIMAL).unwrap();
        rules.max_results_per_query = 500;
        assert_eq!(rules.effective_max_results(), 50);
        rules.max_results_per_query = 10;
        assert_eq!(rules.effective_max_results(), 10);
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        assert!(matches!(
            parse_rules("queries: [unclosed"),
            Err(ConfigError::RulesFileParse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_rules(&dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(ConfigError::RulesFileIo { .. })));
    }

    #[test]
    fn load_rules_from_real_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("refresh.yaml");
        assert!(path.exists(), "refresh.yaml missing at {path:?}");
        let rules = load_rules(&path).unwrap_or_else(|e| panic!("failed to load: {e}"));
        assert!(!rules.queries.is_empty());
        assert!(rules.published_after.is_some());
        assert!(!rules.blocked_channels.is_empty());
        assert!(!rules.blocked_title_patterns.is_empty());
    }
}
