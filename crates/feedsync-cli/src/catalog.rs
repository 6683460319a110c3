//! `cache-skus`: snapshot the store's SKU list for `--known-only` filtering.

use feedsync_core::AppConfig;
use feedsync_store::{write_sku_cache, SkuCache};

use crate::clients::build_admin_client;

/// Fetches every SKU and writes `shop_skus.json`.
///
/// A failed fetch still writes the cache, empty and carrying the error, so
/// a scheduled job downstream sees a well-formed file.
///
/// # Errors
///
/// Returns an error if the client cannot be configured or the cache file
/// cannot be written.
pub(crate) async fn run_cache_skus(config: &AppConfig, page_delay_ms: u64) -> anyhow::Result<()> {
    let client = build_admin_client(config)?;
    let path = config.sku_cache_path();

    let cache = match client
        .fetch_all_skus(config.catalog_page_size, page_delay_ms)
        .await
    {
        Ok(skus) => SkuCache::new(skus),
        Err(err) => {
            tracing::error!(error = %err, "SKU fetch failed, writing empty cache");
            SkuCache::failed(err.to_string())
        }
    };

    write_sku_cache(&path, &cache)?;
    tracing::info!(path = %path.display(), count = cache.count, "wrote SKU cache");
    println!("cached {} SKUs to {}", cache.count, path.display());
    Ok(())
}
