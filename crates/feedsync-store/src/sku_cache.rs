//! Cache of SKUs known to exist in the storefront (`shop_skus.json`).

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::{open_if_exists, write_atomically};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuCache {
    /// Sorted, de-duplicated SKUs.
    pub skus: Vec<String>,
    pub count: usize,
    pub updated: DateTime<Utc>,
    /// Set when the fetch failed and this cache was written empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SkuCache {
    #[must_use]
    pub fn new(skus: BTreeSet<String>) -> Self {
        let skus: Vec<String> = skus.into_iter().collect();
        Self {
            count: skus.len(),
            skus,
            updated: Utc::now(),
            error: None,
        }
    }

    /// An empty cache recording why the fetch failed.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            skus: Vec::new(),
            count: 0,
            updated: Utc::now(),
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub fn known_skus(&self) -> HashSet<String> {
        self.skus.iter().cloned().collect()
    }
}

/// Writes the cache as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`StoreError::Io`] or [`StoreError::Json`] if the file cannot be written.
pub fn write_sku_cache(path: &Path, cache: &SkuCache) -> Result<(), StoreError> {
    write_atomically(path, |file| {
        serde_json::to_writer_pretty(file, cache).map_err(|e| StoreError::json(path, e))
    })
}

/// Reads the cache. Returns `Ok(None)` if it has never been written.
///
/// # Errors
///
/// Returns [`StoreError::Json`] if the file is not a valid cache document.
pub fn read_sku_cache(path: &Path) -> Result<Option<SkuCache>, StoreError> {
    let Some(file) = open_if_exists(path)? else {
        return Ok(None);
    };
    let cache = serde_json::from_reader(std::io::BufReader::new(file))
        .map_err(|e| StoreError::json(path, e))?;
    Ok(Some(cache))
}
