//! Previous-run price snapshot (`last_prices.csv`).
//!
//! Holds `SKU,Retail_Price,Stock` for every feed row of the last delta run.
//! It is overwritten wholesale each run; no history is kept.

use std::collections::BTreeMap;
use std::path::Path;

use feedsync_core::SnapshotEntry;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::StoreError;
use crate::{open_if_exists, write_atomically};

pub const SNAPSHOT_HEADERS: [&str; 3] = ["SKU", "Retail_Price", "Stock"];

#[derive(Debug, Deserialize)]
struct SnapshotRow {
    #[serde(rename = "SKU")]
    sku: String,
    #[serde(rename = "Retail_Price")]
    retail_price: Decimal,
    #[serde(rename = "Stock")]
    stock: i64,
}

/// Reads the snapshot. Returns `Ok(None)` if no previous run left one.
///
/// Duplicate SKUs resolve to the last row.
///
/// # Errors
///
/// Returns [`StoreError::Csv`] if the file is malformed.
pub fn read_snapshot(path: &Path) -> Result<Option<BTreeMap<String, SnapshotEntry>>, StoreError> {
    let Some(file) = open_if_exists(path)? else {
        return Ok(None);
    };

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut snapshot = BTreeMap::new();
    for result in rdr.deserialize::<SnapshotRow>() {
        let row = result.map_err(|e| StoreError::csv(path, e))?;
        if row.sku.is_empty() {
            continue;
        }
        snapshot.insert(
            row.sku,
            SnapshotEntry {
                retail_price: row.retail_price,
                stock: row.stock,
            },
        );
    }

    Ok(Some(snapshot))
}

/// Overwrites the snapshot with `snapshot`.
///
/// # Errors
///
/// Returns [`StoreError::Io`] or [`StoreError::Csv`] if the file cannot be written.
pub fn write_snapshot(
    path: &Path,
    snapshot: &BTreeMap<String, SnapshotEntry>,
) -> Result<(), StoreError> {
    write_atomically(path, |file| {
        let mut wtr = csv::Writer::from_writer(file);
        wtr.write_record(SNAPSHOT_HEADERS)
            .map_err(|e| StoreError::csv(path, e))?;
        for (sku, entry) in snapshot {
            let price = entry.retail_price.normalize().to_string();
            let stock = entry.stock.to_string();
            wtr.write_record([sku.as_str(), price.as_str(), stock.as_str()])
                .map_err(|e| StoreError::csv(path, e))?;
        }
        wtr.flush().map_err(|e| StoreError::io(path, e))
    })?;

    tracing::debug!(path = %path.display(), skus = snapshot.len(), "wrote price snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(price: i64, stock: i64) -> SnapshotEntry {
        SnapshotEntry {
            retail_price: Decimal::from(price),
            stock,
        }
    }

    #[test]
    fn missing_snapshot_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_snapshot(&dir.path().join("last_prices.csv"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn write_then_read_preserves_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_prices.csv");
        let snapshot = BTreeMap::from([
            ("4001".to_string(), entry(159, 4)),
            ("4002".to_string(), entry(79, 0)),
        ]);
        write_snapshot(&path, &snapshot).unwrap();
        assert_eq!(read_snapshot(&path).unwrap(), Some(snapshot));
    }

    #[test]
    fn written_file_has_expected_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_prices.csv");
        write_snapshot(&path, &BTreeMap::from([("4001".to_string(), entry(159, 4))])).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "SKU,Retail_Price,Stock\n4001,159,4\n");
    }

    #[test]
    fn reads_float_formatted_prices() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_prices.csv");
        std::fs::write(&path, "SKU,Retail_Price,Stock\n4001,159.0,4\n").unwrap();
        let snapshot = read_snapshot(&path).unwrap().unwrap();
        assert_eq!(snapshot["4001"], entry(159, 4));
    }

    #[test]
    fn keeps_leading_zeros_in_skus() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_prices.csv");
        std::fs::write(&path, "SKU,Retail_Price,Stock\n000123,19,1\n").unwrap();
        let snapshot = read_snapshot(&path).unwrap().unwrap();
        assert!(snapshot.contains_key("000123"));
    }
}
