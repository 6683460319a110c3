//! Client construction and feed loading shared by the stage handlers.

use feedsync_core::{AppConfig, FeedRecord};
use feedsync_feed::FeedClient;
use feedsync_shopify::{AdminClient, ClientSettings};

/// Builds an Admin API client from the store and token in `config`.
///
/// # Errors
///
/// Returns an error if the store or token is not configured, or the store is
/// not a usable URL.
pub(crate) fn build_admin_client(config: &AppConfig) -> anyhow::Result<AdminClient> {
    let store = config.require_store()?;
    let token = config.require_access_token()?;
    let client = AdminClient::new(store, token, &ClientSettings::from_config(config))?;
    Ok(client)
}

/// Downloads and parses the supplier feed.
///
/// When `strict` is `false`, a download or parse failure is logged and
/// `Ok(None)` is returned so the caller can still write an empty output
/// file. Missing configuration is always an error.
pub(crate) async fn load_feed(
    config: &AppConfig,
    strict: bool,
) -> anyhow::Result<Option<Vec<FeedRecord>>> {
    let url = config.require_feed_url()?;
    let client = FeedClient::new(config.request_timeout_secs, &config.user_agent)?;

    match client.fetch_records(url).await {
        Ok(records) => Ok(Some(records)),
        Err(err) if !strict => {
            tracing::error!(error = %err, "feed fetch failed, continuing with empty output");
            Ok(None)
        }
        Err(err) => Err(anyhow::Error::new(err).context("feed fetch failed")),
    }
}
