pub mod app_config;
pub mod config;
pub mod delta;
pub mod pricing;
pub mod records;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use delta::{
    catalog_delta, filter_known_skus, full_transform, snapshot_delta, snapshot_from_feed,
};
pub use pricing::{retail_price, Pricing, DEFAULT_MARKUP};
pub use records::{
    CatalogVariant, ChangeCommand, ChangeFlags, ChangeRecord, FeedRecord, PricedRecord,
    ReportEntry, SnapshotEntry, UpdateReport, UpdateStatus, UpdateSummary,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("retail price for SKU {sku} overflows (b2b price {b2b_price}, markup {markup})")]
    Overflow {
        sku: String,
        b2b_price: rust_decimal::Decimal,
        markup: rust_decimal::Decimal,
    },
}
