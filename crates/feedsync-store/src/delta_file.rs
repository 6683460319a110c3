//! The delta file: a Matrixify-style CSV of variant updates.
//!
//! ```text
//! Variant SKU,Variant Price,Variant Cost,Variant Inventory Qty,Variant Command
//! 4001,159,99.95,4,UPDATE
//! ```
//!
//! An empty change set still produces the header line so downstream jobs can
//! always parse the file.

use std::path::Path;

use feedsync_core::{ChangeCommand, ChangeFlags, ChangeRecord};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::StoreError;
use crate::{open_if_exists, write_atomically};

pub const DELTA_FILE_HEADERS: [&str; 5] = [
    "Variant SKU",
    "Variant Price",
    "Variant Cost",
    "Variant Inventory Qty",
    "Variant Command",
];

#[derive(Debug, Deserialize)]
struct DeltaRow {
    #[serde(rename = "Variant SKU")]
    sku: String,
    #[serde(rename = "Variant Price")]
    price: Decimal,
    #[serde(rename = "Variant Cost")]
    cost: Decimal,
    #[serde(rename = "Variant Inventory Qty")]
    inventory: i64,
    // Older files used a bare `Command` header.
    #[serde(rename = "Variant Command", alias = "Command", default)]
    command: ChangeCommand,
}

/// Writes `changes` to `path`, replacing any existing file.
///
/// Returns the number of data rows written.
///
/// # Errors
///
/// Returns [`StoreError::Io`] or [`StoreError::Csv`] if the file cannot be written.
pub fn write_delta_file(path: &Path, changes: &[ChangeRecord]) -> Result<usize, StoreError> {
    write_atomically(path, |file| {
        let mut wtr = csv::Writer::from_writer(file);
        wtr.write_record(DELTA_FILE_HEADERS)
            .map_err(|e| StoreError::csv(path, e))?;
        for change in changes {
            let price = change.price.normalize().to_string();
            let cost = change.cost.normalize().to_string();
            let inventory = change.inventory.to_string();
            wtr.write_record([
                change.sku.as_str(),
                price.as_str(),
                cost.as_str(),
                inventory.as_str(),
                "UPDATE",
            ])
            .map_err(|e| StoreError::csv(path, e))?;
        }
        wtr.flush().map_err(|e| StoreError::io(path, e))
    })?;

    tracing::debug!(path = %path.display(), rows = changes.len(), "wrote delta file");
    Ok(changes.len())
}

/// Writes a header-only delta file.
///
/// # Errors
///
/// Returns [`StoreError::Io`] or [`StoreError::Csv`] if the file cannot be written.
pub fn write_empty_delta_file(path: &Path) -> Result<(), StoreError> {
    write_delta_file(path, &[]).map(|_| ())
}

/// Reads a delta file. Returns `Ok(None)` when the file does not exist.
///
/// # Errors
///
/// - [`StoreError::Csv`] if a row is malformed or a required column is missing.
/// - [`StoreError::InvalidRow`] if a row has an empty SKU.
pub fn read_delta_file(path: &Path) -> Result<Option<Vec<ChangeRecord>>, StoreError> {
    let Some(file) = open_if_exists(path)? else {
        return Ok(None);
    };

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut changes = Vec::new();
    for result in rdr.deserialize::<DeltaRow>() {
        let row = result.map_err(|e| StoreError::csv(path, e))?;
        if row.sku.is_empty() {
            return Err(StoreError::InvalidRow {
                path: path.to_path_buf(),
                // +1 for the header line, +1 for 1-based numbering
                line: changes.len() as u64 + 2,
                reason: "empty Variant SKU".to_string(),
            });
        }
        changes.push(ChangeRecord {
            sku: row.sku,
            price: row.price,
            cost: row.cost,
            inventory: row.inventory,
            command: row.command,
            flags: ChangeFlags::default(),
        });
    }

    Ok(Some(changes))
}
