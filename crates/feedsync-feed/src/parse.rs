//! Supplier CSV feed parsing.
//!
//! Columns are located by header name, so column order and any extra columns
//! in the feed do not matter. Rows without a SKU are skipped.

use std::str::FromStr;

use feedsync_core::FeedRecord;
use rust_decimal::Decimal;

use crate::error::FeedError;

pub const SKU_COLUMN: &str = "SKU";
pub const B2B_PRICE_COLUMN: &str = "B2B price";
pub const STOCK_COLUMN: &str = "Stock";

/// Parses the feed body into records.
///
/// A body that is empty, or holds only a header row, yields no records.
///
/// # Errors
///
/// - [`FeedError::Csv`] if the body is not well-formed CSV.
/// - [`FeedError::MissingColumn`] if `SKU`, `B2B price`, or `Stock` is absent.
/// - [`FeedError::InvalidValue`] if a price or stock cell cannot be parsed.
pub fn parse_feed(body: &str) -> Result<Vec<FeedRecord>, FeedError> {
    let body = body.strip_prefix('\u{feff}').unwrap_or(body);
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader.headers()?.clone();
    let column = |name: &str| -> Result<usize, FeedError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| FeedError::MissingColumn(name.to_string()))
    };
    let sku_idx = column(SKU_COLUMN)?;
    let price_idx = column(B2B_PRICE_COLUMN)?;
    let stock_idx = column(STOCK_COLUMN)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        let row = result?;
        let line = row.position().map_or(0, csv::Position::line);

        let sku = row.get(sku_idx).unwrap_or_default();
        if sku.is_empty() {
            skipped += 1;
            continue;
        }

        let raw_price = row.get(price_idx).unwrap_or_default();
        let b2b_price = Decimal::from_str(raw_price).map_err(|_| FeedError::InvalidValue {
            line,
            column: B2B_PRICE_COLUMN.to_string(),
            value: raw_price.to_string(),
        })?;

        let raw_stock = row.get(stock_idx).unwrap_or_default();
        let stock = parse_stock(raw_stock).ok_or_else(|| FeedError::InvalidValue {
            line,
            column: STOCK_COLUMN.to_string(),
            value: raw_stock.to_string(),
        })?;

        records.push(FeedRecord {
            sku: sku.to_string(),
            b2b_price,
            stock,
        });
    }

    if skipped > 0 {
        tracing::warn!(skipped, "skipped feed rows without a SKU");
    }
    tracing::debug!(rows = records.len(), "parsed supplier feed");
    Ok(records)
}

/// Parses a stock cell. Accepts whole numbers written as decimals (`"5.0"`),
/// which spreadsheet exports sometimes produce.
fn parse_stock(raw: &str) -> Option<i64> {
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    let value = Decimal::from_str(raw).ok()?;
    if value.fract().is_zero() {
        i64::try_from(value).ok()
    } else {
        None
    }
}
