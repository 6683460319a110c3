//! Delta engine: decides which feed rows need to be pushed.
//!
//! All functions are pure. Duplicate SKUs in the feed collapse to the last
//! occurrence (last feed value wins) while keeping the position of the first.

use std::collections::{BTreeMap, HashMap, HashSet};

use rust_decimal::Decimal;

use crate::records::{CatalogVariant, ChangeFlags, ChangeRecord, PricedRecord, SnapshotEntry};

/// Price or cost differences at or below this amount are treated as equal
/// when comparing against live catalog values.
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Collapses duplicate SKUs, keeping the last value at the first position.
fn dedupe_last_wins(records: &[PricedRecord]) -> Vec<&PricedRecord> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(records.len());
    let mut out: Vec<&PricedRecord> = Vec::with_capacity(records.len());
    for record in records {
        if let Some(&pos) = index.get(record.sku.as_str()) {
            out[pos] = record;
        } else {
            index.insert(record.sku.as_str(), out.len());
            out.push(record);
        }
    }
    out
}

/// Diffs the current feed against the previous run's snapshot.
///
/// A row is emitted when its retail price or stock differs from the
/// snapshot, or when its SKU is absent from the snapshot. With no snapshot
/// every row is emitted.
#[must_use]
pub fn snapshot_delta(
    current: &[PricedRecord],
    previous: Option<&BTreeMap<String, SnapshotEntry>>,
) -> Vec<ChangeRecord> {
    dedupe_last_wins(current)
        .into_iter()
        .filter_map(|record| {
            let flags = match previous.map(|snapshot| snapshot.get(&record.sku)) {
                None | Some(None) => ChangeFlags {
                    new: true,
                    ..ChangeFlags::default()
                },
                Some(Some(prev)) => ChangeFlags {
                    price: prev.retail_price != record.retail_price,
                    stock: prev.stock != record.stock,
                    ..ChangeFlags::default()
                },
            };
            flags
                .any()
                .then(|| ChangeRecord::from_priced(record, flags))
        })
        .collect()
}

/// Diffs the current feed against live storefront state.
///
/// Only SKUs present in the catalog are considered. A row is emitted when the
/// retail price or cost differ by more than [`MONEY_TOLERANCE`], or the
/// stock differs. A catalog variant without a unit cost compares as zero.
#[must_use]
pub fn catalog_delta(
    current: &[PricedRecord],
    catalog: &HashMap<String, CatalogVariant>,
) -> Vec<ChangeRecord> {
    dedupe_last_wins(current)
        .into_iter()
        .filter_map(|record| {
            let live = catalog.get(&record.sku)?;
            let live_cost = live.cost.unwrap_or(Decimal::ZERO);
            let flags = ChangeFlags {
                price: (record.retail_price - live.price).abs() > MONEY_TOLERANCE,
                cost: (record.cost - live_cost).abs() > MONEY_TOLERANCE,
                stock: record.stock != live.inventory_quantity,
                new: false,
            };
            flags
                .any()
                .then(|| ChangeRecord::from_priced(record, flags))
        })
        .collect()
}

/// Turns every feed row into an update, without diffing.
#[must_use]
pub fn full_transform(current: &[PricedRecord]) -> Vec<ChangeRecord> {
    dedupe_last_wins(current)
        .into_iter()
        .map(|record| ChangeRecord::from_priced(record, ChangeFlags::default()))
        .collect()
}

/// Keeps only changes whose SKU exists in the storefront.
#[must_use]
pub fn filter_known_skus(changes: Vec<ChangeRecord>, known: &HashSet<String>) -> Vec<ChangeRecord> {
    changes
        .into_iter()
        .filter(|c| known.contains(&c.sku))
        .collect()
}

/// Builds the snapshot the next delta run will compare against.
#[must_use]
pub fn snapshot_from_feed(current: &[PricedRecord]) -> BTreeMap<String, SnapshotEntry> {
    current
        .iter()
        .map(|r| {
            (
                r.sku.clone(),
                SnapshotEntry {
                    retail_price: r.retail_price,
                    stock: r.stock,
                },
            )
        })
        .collect()
}

#[cfg(test)]
#[path = "delta_test.rs"]
mod tests;
