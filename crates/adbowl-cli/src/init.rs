use std::path::Path;

use adbowl_core::{save_dataset, Dataset};
use anyhow::Context;
use chrono::NaiveDate;

/// Create an empty dataset file for a new event.
///
/// # Errors
///
/// Returns an error if the file exists and `force` is not set, or if the
/// file or its parent directory cannot be written.
pub(crate) fn run_init(
    data_path: &Path,
    event: &str,
    year: i32,
    force: bool,
    today: NaiveDate,
) -> anyhow::Result<()> {
    if event.trim().is_empty() {
        anyhow::bail!("event label must be non-empty");
    }

    if data_path.exists() && !force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite",
            data_path.display()
        );
    }

    if let Some(parent) = data_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let dataset = Dataset::empty(event.trim(), year, today);
    save_dataset(data_path, &dataset)?;

    tracing::info!(path = %data_path.display(), event = %dataset.event, year, "dataset created");
    println!("created {} for {} {}", data_path.display(), dataset.event, year);
    Ok(())
}
