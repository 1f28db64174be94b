mod init;
mod leaderboard;
mod refresh;

use std::path::PathBuf;
use std::process::ExitCode;

use adbowl_core::{AppConfig, MergeOutcome};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::leaderboard::SortMode;
use crate::refresh::RefreshOptions;

#[derive(Debug, Parser)]
#[command(name = "adbowl")]
#[command(about = "Discover big-game ads on YouTube and keep the ad dataset current")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for new ads and append them to the dataset
    Refresh {
        /// Dataset file (defaults to `ADBOWL_DATA_PATH`)
        #[arg(long)]
        data: Option<PathBuf>,
        /// Refresh rules file (defaults to `ADBOWL_RULES_PATH`)
        #[arg(long)]
        rules: Option<PathBuf>,
        /// Report what would be added without writing the dataset
        #[arg(long)]
        dry_run: bool,
    },
    /// Create an empty dataset for a new event
    Init {
        /// Event label, e.g. "Super Bowl LX"
        #[arg(long)]
        event: String,
        /// Event year
        #[arg(long)]
        year: i32,
        #[arg(long)]
        data: Option<PathBuf>,
        /// Overwrite an existing dataset file
        #[arg(long)]
        force: bool,
    },
    /// Print a view-count leaderboard for ads in the dataset
    Leaderboard {
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = SortMode::Views)]
        sort: SortMode,
        /// Maximum rows to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

/// Exit status contract: 0 updated, 1 nothing new, 2 fatal error.
const EXIT_UPDATED: u8 = 0;
const EXIT_NOTHING_NEW: u8 = 1;
const EXIT_FATAL: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match adbowl_core::load_app_config_from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("adbowl: {e}");
            return ExitCode::from(EXIT_FATAL);
        }
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    ExitCode::from(exit_code(run(cli, &config).await))
}

fn exit_status(outcome: MergeOutcome) -> u8 {
    match outcome {
        MergeOutcome::Updated { .. } => EXIT_UPDATED,
        MergeOutcome::NothingNew => EXIT_NOTHING_NEW,
    }
}

fn exit_code(result: anyhow::Result<u8>) -> u8 {
    result.unwrap_or_else(|e| {
        tracing::error!(error = %format!("{e:#}"), "fatal");
        EXIT_FATAL
    })
}

async fn run(cli: Cli, config: &AppConfig) -> anyhow::Result<u8> {
    let today = chrono::Local::now().date_naive();

    let command = cli.command.unwrap_or(Commands::Refresh {
        data: None,
        rules: None,
        dry_run: false,
    });

    match command {
        Commands::Refresh {
            data,
            rules,
            dry_run,
        } => {
            let options = RefreshOptions {
                data_path: data.unwrap_or_else(|| config.data_path.clone()),
                rules_path: rules.unwrap_or_else(|| config.rules_path.clone()),
                dry_run,
            };
            let report = refresh::run_refresh(config, &options, today).await?;
            refresh::print_report(&report);
            Ok(exit_status(report.outcome))
        }
        Commands::Init {
            event,
            year,
            data,
            force,
        } => {
            let data_path = data.unwrap_or_else(|| config.data_path.clone());
            init::run_init(&data_path, &event, year, force, today)?;
            Ok(EXIT_UPDATED)
        }
        Commands::Leaderboard { data, sort, limit } => {
            let data_path = data.unwrap_or_else(|| config.data_path.clone());
            leaderboard::run_leaderboard(config, &data_path, sort, limit).await?;
            Ok(EXIT_UPDATED)
        }
    }
}

#[cfg(test)]
mod tests;
