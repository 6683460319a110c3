//! Normalisation of the configured store into an Admin API base URL.

use reqwest::Url;

use crate::error::ShopifyError;

/// Turns `shop.myshopify.com`, `https://shop.myshopify.com/admin`, or a full
/// `http://127.0.0.1:8080` into the store's origin with a trailing `/`.
///
/// A bare host is assumed to be HTTPS.
///
/// # Errors
///
/// Returns [`ShopifyError::InvalidStoreUrl`] if the value is empty or does not
/// parse as a URL with a host.
pub fn store_base_url(store: &str) -> Result<Url, ShopifyError> {
    let invalid = |reason: String| ShopifyError::InvalidStoreUrl {
        store: store.to_owned(),
        reason,
    };

    let trimmed = store.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(invalid("store is empty".to_owned()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };
    let url = Url::parse(&candidate).map_err(|e| invalid(e.to_string()))?;
    if url.host_str().is_none() {
        return Err(invalid("URL has no host".to_owned()));
    }

    Url::parse(&format!("{}/", url.origin().ascii_serialization()))
        .map_err(|e| invalid(e.to_string()))
}

/// Host name for log fields and error messages.
pub(super) fn store_host(base_url: &Url) -> String {
    base_url
        .host_str()
        .map_or_else(|| base_url.to_string(), str::to_owned)
}
