//! `push`: send the delta file to the store in batches.

use std::path::PathBuf;

use chrono::Utc;
use feedsync_core::{AppConfig, UpdateReport};
use feedsync_shopify::{run_batch_update, BatchOptions};
use feedsync_store::{read_delta_file, write_report};

use crate::clients::build_admin_client;

/// Pushes every record in the delta file and writes the CSV and JSON report.
///
/// Per-SKU failures are recorded in the report and do not fail the command.
/// An empty delta file still gets a report with zero totals. A dry run logs
/// the batch plan and writes no report.
///
/// # Errors
///
/// Returns an error if the delta file is missing or malformed, the client
/// cannot be configured, or the report cannot be written.
pub(crate) async fn run_push(
    config: &AppConfig,
    input: Option<PathBuf>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let path = input.unwrap_or_else(|| config.delta_file_path());
    let Some(changes) = read_delta_file(&path)? else {
        anyhow::bail!(
            "no delta file at {}; run `feedsync delta` or `feedsync direct` first",
            path.display()
        );
    };
    if changes.is_empty() {
        tracing::info!(path = %path.display(), "delta file is empty, nothing to push");
        if dry_run {
            println!("nothing to push");
        } else {
            let mut report = UpdateReport::default();
            report.finish(Utc::now(), 0);
            let paths = write_report(&config.reports_dir(), &report)?;
            println!("nothing to push; empty report at {}", paths.csv.display());
        }
        return Ok(());
    }

    let client = build_admin_client(config)?;
    let options = BatchOptions::from_config(config, config.require_location_id()?, dry_run);
    let report = run_batch_update(&client, &changes, &options).await;

    if dry_run {
        println!(
            "dry run: {} records in {} batches, nothing sent",
            changes.len(),
            report.summary.batches
        );
        return Ok(());
    }

    let paths = write_report(&config.reports_dir(), &report)?;
    let summary = &report.summary;
    println!(
        "updated {}, not found {}, failed {} of {}; report at {}",
        summary.updated,
        summary.not_found,
        summary.failed,
        summary.total,
        paths.csv.display()
    );
    Ok(())
}

#[cfg(test)]
#[path = "push_test.rs"]
mod tests;
