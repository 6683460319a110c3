//! Stages that turn the supplier feed into an update file: `transform`,
//! `delta`, and `direct`.

use feedsync_core::{
    catalog_delta, filter_known_skus, full_transform, snapshot_delta, snapshot_from_feed,
    AppConfig, ChangeRecord, Pricing,
};
use feedsync_store::{
    read_sku_cache, read_snapshot, write_delta_file, write_empty_delta_file, write_snapshot,
};

use crate::clients::{build_admin_client, load_feed};
use crate::CatalogSource;

/// Writes every feed row to the full update file.
///
/// # Errors
///
/// Returns an error if the feed cannot be loaded or the file cannot be written.
pub(crate) async fn run_transform(config: &AppConfig) -> anyhow::Result<()> {
    let records = load_feed(config, true).await?.unwrap_or_default();
    let priced = Pricing::new(config.price_markup).price_all(&records)?;
    let changes = full_transform(&priced);

    let path = config.full_update_path();
    let written = write_delta_file(&path, &changes)?;
    tracing::info!(path = %path.display(), rows = written, "wrote full update file");
    println!("wrote {written} rows to {}", path.display());
    Ok(())
}

/// Diffs the feed against `last_prices.csv`, writes the delta file, and
/// replaces the snapshot with the current feed.
///
/// # Errors
///
/// Returns an error on missing configuration, an unreadable snapshot or SKU
/// cache, a write failure, or (with `strict`) a feed failure.
pub(crate) async fn run_delta(
    config: &AppConfig,
    known_only: bool,
    strict: bool,
) -> anyhow::Result<()> {
    let delta_path = config.delta_file_path();
    let Some(records) = load_feed(config, strict).await? else {
        write_empty_delta_file(&delta_path)?;
        println!("feed unavailable, wrote empty delta file to {}", delta_path.display());
        return Ok(());
    };

    let priced = Pricing::new(config.price_markup).price_all(&records)?;
    let snapshot_path = config.snapshot_path();
    let previous = read_snapshot(&snapshot_path)?;
    if previous.is_none() {
        tracing::info!(path = %snapshot_path.display(), "no previous snapshot, every row is a change");
    }

    let mut changes = snapshot_delta(&priced, previous.as_ref());
    log_breakdown(&changes);
    if known_only {
        changes = keep_known(config, changes)?;
    }

    let written = write_delta_file(&delta_path, &changes)?;

    if priced.is_empty() && previous.is_some() {
        tracing::warn!("feed is empty, keeping the previous snapshot");
    } else {
        write_snapshot(&snapshot_path, &snapshot_from_feed(&priced))?;
    }

    tracing::info!(path = %delta_path.display(), rows = written, feed_rows = priced.len(), "wrote delta file");
    println!("{written} changed of {} feed rows, written to {}", priced.len(), delta_path.display());
    Ok(())
}

/// Diffs the feed against the live catalog and writes the delta file.
///
/// # Errors
///
/// Returns an error on missing configuration, a catalog fetch failure, an
/// unreadable SKU cache, a write failure, or (with `strict`) a feed failure.
pub(crate) async fn run_direct(
    config: &AppConfig,
    source: CatalogSource,
    known_only: bool,
    strict: bool,
    page_delay_ms: u64,
) -> anyhow::Result<()> {
    let client = build_admin_client(config)?;
    let delta_path = config.delta_file_path();

    let Some(records) = load_feed(config, strict).await? else {
        write_empty_delta_file(&delta_path)?;
        println!("feed unavailable, wrote empty delta file to {}", delta_path.display());
        return Ok(());
    };
    let priced = Pricing::new(config.price_markup).price_all(&records)?;

    let catalog = match source {
        CatalogSource::Graphql => {
            client
                .fetch_catalog(config.catalog_page_size, page_delay_ms)
                .await?
        }
        CatalogSource::Rest => {
            tracing::warn!("REST catalog has no unit cost, so every SKU with a cost is flagged as changed");
            client
                .fetch_catalog_rest(config.catalog_page_size, page_delay_ms)
                .await?
        }
    };

    let mut changes = catalog_delta(&priced, &catalog);
    log_breakdown(&changes);
    if known_only {
        changes = keep_known(config, changes)?;
    }

    let written = write_delta_file(&delta_path, &changes)?;
    tracing::info!(
        path = %delta_path.display(),
        rows = written,
        catalog = catalog.len(),
        feed_rows = priced.len(),
        "wrote delta file"
    );
    println!("{written} changed of {} feed rows, written to {}", priced.len(), delta_path.display());
    Ok(())
}

/// Restricts `changes` to SKUs in the cached storefront list.
fn keep_known(config: &AppConfig, changes: Vec<ChangeRecord>) -> anyhow::Result<Vec<ChangeRecord>> {
    let path = config.sku_cache_path();
    let cache = read_sku_cache(&path)?.ok_or_else(|| {
        anyhow::anyhow!(
            "--known-only needs {}; run `feedsync cache-skus` first",
            path.display()
        )
    })?;
    if let Some(err) = &cache.error {
        tracing::warn!(error = %err, "SKU cache was written after a failed fetch and is empty");
    }

    let before = changes.len();
    let kept = filter_known_skus(changes, &cache.known_skus());
    tracing::info!(before, kept = kept.len(), "filtered changes to known SKUs");
    Ok(kept)
}

fn log_breakdown(changes: &[ChangeRecord]) {
    let count = |pick: fn(&ChangeRecord) -> bool| changes.iter().filter(|c| pick(c)).count();
    tracing::info!(
        total = changes.len(),
        price = count(|c| c.flags.price),
        cost = count(|c| c.flags.cost),
        stock = count(|c| c.flags.stock),
        new = count(|c| c.flags.new),
        "computed changes"
    );
    for change in changes {
        tracing::debug!(sku = %change.sku, flags = ?change.flags, price = %change.price, inventory = change.inventory, "change");
    }
}

#[cfg(test)]
#[path = "delta_test.rs"]
mod tests;
