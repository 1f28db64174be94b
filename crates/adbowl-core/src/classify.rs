//! Accept/reject predicate for search hits.
//!
//! A hit is rejected when its channel is on the blocklist or its title matches
//! one of the non-ad patterns (reactions, compilations, halftime coverage and
//! so on). Everything else becomes a fresh [`AdRecord`] awaiting curation.

use std::collections::HashSet;

use regex::Regex;

use crate::dataset::AdRecord;
use crate::rules::{normalize_channel, RefreshRules};
use crate::ConfigError;

/// A raw search result: video id, channel display name, title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub video_id: String,
    pub channel_title: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    BlockedChannel,
    BlockedTitle { pattern: String },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::BlockedChannel => write!(f, "channel"),
            RejectReason::BlockedTitle { pattern } => write!(f, "title /{pattern}/"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub hit: SearchHit,
    pub reason: RejectReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accept(AdRecord),
    Reject(Rejection),
}

#[derive(Debug, Clone)]
pub struct Classifier {
    blocked_channels: HashSet<String>,
    title_patterns: Vec<Regex>,
}

impl Classifier {
    /// Build a classifier from raw channel names and pattern strings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if a pattern does not compile.
    pub fn new<C, P>(blocked_channels: C, title_patterns: P) -> Result<Self, ConfigError>
    where
        C: IntoIterator,
        C::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let blocked_channels = blocked_channels
            .into_iter()
            .map(|c| normalize_channel(c.as_ref()))
            .collect();
        let title_patterns = title_patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(p).map_err(|e| {
                    ConfigError::Validation(format!("invalid title pattern '{p}': {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            blocked_channels,
            title_patterns,
        })
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if a pattern does not compile.
    pub fn from_rules(rules: &RefreshRules) -> Result<Self, ConfigError> {
        Self::new(&rules.blocked_channels, &rules.blocked_title_patterns)
    }

    #[must_use]
    pub fn is_blocked_channel(&self, channel_title: &str) -> bool {
        self.blocked_channels
            .contains(&normalize_channel(channel_title))
    }

    /// Returns the first pattern matching the lower-cased title.
    #[must_use]
    pub fn blocked_title_pattern(&self, title: &str) -> Option<&str> {
        let lower = title.to_lowercase();
        self.title_patterns
            .iter()
            .find(|re| re.is_match(&lower))
            .map(Regex::as_str)
    }

    #[must_use]
    pub fn classify(&self, hit: &SearchHit) -> Verdict {
        if self.is_blocked_channel(&hit.channel_title) {
            return Verdict::Reject(Rejection {
                hit: hit.clone(),
                reason: RejectReason::BlockedChannel,
            });
        }

        if let Some(pattern) = self.blocked_title_pattern(&hit.title) {
            return Verdict::Reject(Rejection {
                hit: hit.clone(),
                reason: RejectReason::BlockedTitle {
                    pattern: pattern.to_string(),
                },
            });
        }

        Verdict::Accept(AdRecord::discovered(
            &hit.video_id,
            &hit.channel_title,
            &hit.title,
        ))
    }
}
