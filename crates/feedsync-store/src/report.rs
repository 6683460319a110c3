//! Per-run update reports under `reports/`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use feedsync_core::UpdateReport;

use crate::error::StoreError;
use crate::write_atomically;

const REPORT_HEADERS: [&str; 7] = [
    "sku",
    "status",
    "price",
    "cost",
    "inventory",
    "variant_id",
    "message",
];

/// Locations of the two files written for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub csv: PathBuf,
    pub json: PathBuf,
}

impl ReportPaths {
    #[must_use]
    pub fn for_run(dir: &Path, started_at: DateTime<Utc>) -> Self {
        let stem = format!("update_report_{}", started_at.format("%Y%m%d_%H%M%S"));
        Self {
            csv: dir.join(format!("{stem}.csv")),
            json: dir.join(format!("{stem}.json")),
        }
    }
}

/// Writes the per-SKU CSV and the full JSON report into `dir`.
///
/// File names are derived from the run's start time, falling back to now.
///
/// # Errors
///
/// Returns [`StoreError`] if either file cannot be written.
pub fn write_report(dir: &Path, report: &UpdateReport) -> Result<ReportPaths, StoreError> {
    let started_at = report.summary.started_at.unwrap_or_else(Utc::now);
    let paths = ReportPaths::for_run(dir, started_at);

    write_atomically(&paths.csv, |file| {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        wtr.write_record(REPORT_HEADERS)
            .map_err(|e| StoreError::csv(&paths.csv, e))?;
        for entry in &report.entries {
            wtr.serialize(entry)
                .map_err(|e| StoreError::csv(&paths.csv, e))?;
        }
        wtr.flush().map_err(|e| StoreError::io(&paths.csv, e))
    })?;

    write_atomically(&paths.json, |file| {
        serde_json::to_writer_pretty(file, report).map_err(|e| StoreError::json(&paths.json, e))
    })?;

    tracing::info!(
        csv = %paths.csv.display(),
        json = %paths.json.display(),
        entries = report.entries.len(),
        "wrote update report"
    );
    Ok(paths)
}
