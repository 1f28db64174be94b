//! Core types and logic for adbowl.
//!
//! Owns the dataset model, runtime configuration, the refresh rules file,
//! the ad classifier and the merge step. Network access lives in
//! `adbowl-youtube`; orchestration lives in the CLI.

pub mod app_config;
pub mod classify;
pub mod config;
pub mod dataset;
pub mod merge;
pub mod rules;

use thiserror::Error;

pub use app_config::AppConfig;
pub use classify::{Classifier, RejectReason, Rejection, SearchHit, Verdict};
pub use config::{load_app_config, load_app_config_from_env};
pub use dataset::{load_dataset, save_dataset, AdRecord, Dataset, DatasetError};
pub use merge::{merge_candidates, MergeOutcome};
pub use rules::{load_rules, RefreshRules, MAX_RESULTS_CEILING};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read rules file {path}: {source}")]
    RulesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rules file: {0}")]
    RulesFileParse(#[from] serde_yaml::Error),

    #[error("invalid rules: {0}")]
    Validation(String),
}
