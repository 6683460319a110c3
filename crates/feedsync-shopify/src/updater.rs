//! Sequential batch push of a change set.
//!
//! Each batch is resolved with one lookup query and written with one bulk
//! mutation. A failing batch never stops the run: its records are reported
//! `failed` and the loop moves on. Every input record ends up in the report
//! exactly once.

use std::time::Duration;

use chrono::Utc;
use feedsync_core::{AppConfig, ChangeRecord, ReportEntry, UpdateReport, UpdateStatus};

use crate::client::{AdminClient, UpdateItem};
use crate::graphql::location_gid;

/// Log a progress line every this many batches by default.
pub const DEFAULT_PROGRESS_EVERY: usize = 10;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub batch_size: usize,
    /// Fixed pause between batches; the only rate control.
    pub batch_delay: Duration,
    /// `gid://shopify/Location/...` whose `available` quantity is set.
    pub location_gid: String,
    /// Plan only: no lookups, no mutations, an empty report.
    pub dry_run: bool,
    pub progress_every: usize,
}

impl BatchOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig, location_id: &str, dry_run: bool) -> Self {
        Self {
            batch_size: config.update_batch_size,
            batch_delay: Duration::from_millis(config.batch_delay_ms),
            location_gid: location_gid(location_id),
            dry_run,
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

/// Pushes `changes` in batches of `options.batch_size` and returns the
/// finished report.
pub async fn run_batch_update(
    client: &AdminClient,
    changes: &[ChangeRecord],
    options: &BatchOptions,
) -> UpdateReport {
    let started_at = Utc::now();
    let batch_size = options.batch_size.max(1);
    let total_batches = changes.len().div_ceil(batch_size);
    let mut report = UpdateReport {
        dry_run: options.dry_run,
        ..UpdateReport::default()
    };

    tracing::info!(
        store = client.store(),
        records = changes.len(),
        batch_size,
        batches = total_batches,
        dry_run = options.dry_run,
        "starting batch update"
    );

    for (index, batch) in changes.chunks(batch_size).enumerate() {
        let batch_number = index + 1;

        if options.dry_run {
            tracing::info!(
                batch = batch_number,
                records = batch.len(),
                first_sku = batch.first().map(|c| c.sku.as_str()),
                last_sku = batch.last().map(|c| c.sku.as_str()),
                "dry run: would update batch"
            );
            continue;
        }

        if index > 0 && !options.batch_delay.is_zero() {
            tokio::time::sleep(options.batch_delay).await;
        }

        let entries = process_batch(client, batch, &options.location_gid).await;
        report.entries.extend(entries);

        let at_interval = options.progress_every > 0 && batch_number % options.progress_every == 0;
        if at_interval || batch_number == total_batches {
            tracing::info!(
                batch = batch_number,
                batches = total_batches,
                updated = report.count(UpdateStatus::Updated),
                not_found = report.count(UpdateStatus::NotFound),
                failed = report.count(UpdateStatus::Failed),
                "batch progress"
            );
        }
    }

    report.finish(started_at, total_batches);
    let summary = &report.summary;
    tracing::info!(
        total = summary.total,
        updated = summary.updated,
        not_found = summary.not_found,
        failed = summary.failed,
        elapsed_secs = summary.elapsed_secs,
        updated_per_minute = summary.updated_per_minute,
        "batch update finished"
    );
    report
}

/// Resolves, submits, and reports one batch. Returns one entry per record in
/// `batch`, in order.
async fn process_batch(
    client: &AdminClient,
    batch: &[ChangeRecord],
    location_gid: &str,
) -> Vec<ReportEntry> {
    let skus: Vec<&str> = batch.iter().map(|c| c.sku.as_str()).collect();
    let resolved = match client.lookup_variants(&skus).await {
        Ok(resolved) => resolved,
        Err(err) => {
            tracing::warn!(error = %err, records = batch.len(), "SKU lookup failed, batch marked failed");
            let message = format!("lookup failed: {err}");
            return batch
                .iter()
                .map(|change| ReportEntry::new(change, UpdateStatus::Failed).with_message(&message))
                .collect();
        }
    };

    let mut entries = Vec::with_capacity(batch.len());
    let mut items = Vec::new();
    let mut item_rows = Vec::new();
    for change in batch {
        match resolved.get(&change.sku) {
            Some(handle) => {
                item_rows.push(entries.len());
                items.push(UpdateItem::new(change, handle));
                entries.push(
                    ReportEntry::new(change, UpdateStatus::Failed)
                        .with_variant_id(&handle.variant_id),
                );
            }
            None => entries.push(ReportEntry::new(change, UpdateStatus::NotFound)),
        }
    }

    if items.is_empty() {
        return entries;
    }

    match client.submit_updates(&items, location_gid).await {
        Ok(outcomes) => {
            for (&row, outcome) in item_rows.iter().zip(outcomes) {
                let entry = &mut entries[row];
                match outcome {
                    Ok(()) => entry.status = UpdateStatus::Updated,
                    Err(message) => {
                        tracing::warn!(sku = %entry.sku, %message, "variant update rejected");
                        entry.message = Some(message);
                    }
                }
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, records = items.len(), "bulk mutation failed, batch marked failed");
            let message = format!("mutation failed: {err}");
            for row in item_rows {
                entries[row].message = Some(message.clone());
            }
        }
    }

    entries
}
