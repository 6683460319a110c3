pub mod client;
pub mod error;
pub mod graphql;
pub mod pagination;
mod rate_limit;
pub mod types;
pub mod updater;

pub use client::{
    store_base_url, AdminClient, ClientSettings, ItemOutcome, UpdateItem, VariantHandle,
};
pub use error::ShopifyError;
pub use graphql::{location_gid, sku_search_query};
pub use updater::{run_batch_update, BatchOptions};
