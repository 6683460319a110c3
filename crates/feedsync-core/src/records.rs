//! Records exchanged between the sync stages.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the supplier feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRecord {
    pub sku: String,
    /// Supplier wholesale price; input to the markup formula.
    pub b2b_price: Decimal,
    pub stock: i64,
}

/// A feed row with its retail price computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedRecord {
    pub sku: String,
    pub retail_price: Decimal,
    /// The B2B price, pushed to the storefront as unit cost.
    pub cost: Decimal,
    pub stock: i64,
}

/// A storefront variant as read from the Admin API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogVariant {
    pub sku: String,
    /// Opaque platform ID (a `gid://shopify/ProductVariant/...` for GraphQL,
    /// the numeric ID for REST).
    pub internal_id: String,
    pub inventory_item_id: Option<String>,
    pub price: Decimal,
    /// Unit cost. Absent when the variant has none set, or when the catalog
    /// was read through an endpoint that does not expose it.
    pub cost: Option<Decimal>,
    pub inventory_quantity: i64,
}

/// Last-run values for one SKU, persisted between delta runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub retail_price: Decimal,
    pub stock: i64,
}

/// The only command the delta file ever carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeCommand {
    #[default]
    #[serde(rename = "UPDATE")]
    Update,
}

/// Which fields triggered a change. Used for logging only; not persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeFlags {
    pub price: bool,
    pub cost: bool,
    pub stock: bool,
    /// SKU absent from the comparison baseline.
    pub new: bool,
}

impl ChangeFlags {
    #[must_use]
    pub fn any(&self) -> bool {
        self.price || self.cost || self.stock || self.new
    }
}

/// One line of the delta file: the new values to push for a SKU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub sku: String,
    pub price: Decimal,
    pub cost: Decimal,
    pub inventory: i64,
    pub command: ChangeCommand,
    pub flags: ChangeFlags,
}

impl ChangeRecord {
    #[must_use]
    pub fn from_priced(record: &PricedRecord, flags: ChangeFlags) -> Self {
        Self {
            sku: record.sku.clone(),
            price: record.retail_price,
            cost: record.cost,
            inventory: record.stock,
            command: ChangeCommand::Update,
            flags,
        }
    }
}

/// Outcome of pushing one change record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStatus {
    Updated,
    NotFound,
    Failed,
}

impl std::fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateStatus::Updated => write!(f, "updated"),
            UpdateStatus::NotFound => write!(f, "not_found"),
            UpdateStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Per-SKU line of the update report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub sku: String,
    pub status: UpdateStatus,
    pub price: Decimal,
    pub cost: Decimal,
    pub inventory: i64,
    /// Resolved variant ID, when the lookup found one.
    pub variant_id: Option<String>,
    /// Error detail for `failed` rows.
    pub message: Option<String>,
}

impl ReportEntry {
    #[must_use]
    pub fn new(change: &ChangeRecord, status: UpdateStatus) -> Self {
        Self {
            sku: change.sku.clone(),
            status,
            price: change.price,
            cost: change.cost,
            inventory: change.inventory,
            variant_id: None,
            message: None,
        }
    }

    #[must_use]
    pub fn with_variant_id(mut self, variant_id: impl Into<String>) -> Self {
        self.variant_id = Some(variant_id.into());
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Aggregate counts for an update run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateSummary {
    pub total: usize,
    pub updated: usize,
    pub not_found: usize,
    pub failed: usize,
    pub batches: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub elapsed_secs: f64,
    pub updated_per_minute: f64,
}

/// Write-once result of a batch update run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateReport {
    pub dry_run: bool,
    pub entries: Vec<ReportEntry>,
    pub summary: UpdateSummary,
}

impl UpdateReport {
    #[must_use]
    pub fn count(&self, status: UpdateStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }

    /// Recomputes the counts in [`UpdateSummary`] from `entries` and stamps
    /// the finish time.
    pub fn finish(&mut self, started_at: DateTime<Utc>, batches: usize) {
        let finished_at = Utc::now();
        let elapsed = finished_at - started_at;
        #[allow(clippy::cast_precision_loss)]
        let elapsed_secs = elapsed.num_milliseconds().max(0) as f64 / 1000.0;
        let updated = self.count(UpdateStatus::Updated);
        #[allow(clippy::cast_precision_loss)]
        let updated_per_minute = if elapsed_secs > 0.0 {
            updated as f64 / (elapsed_secs / 60.0)
        } else {
            0.0
        };

        self.summary = UpdateSummary {
            total: self.entries.len(),
            updated,
            not_found: self.count(UpdateStatus::NotFound),
            failed: self.count(UpdateStatus::Failed),
            batches,
            started_at: Some(started_at),
            finished_at: Some(finished_at),
            elapsed_secs,
            updated_per_minute,
        };
    }
}
