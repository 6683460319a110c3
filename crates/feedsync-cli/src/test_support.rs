use std::path::Path;

use feedsync_core::{AppConfig, Environment, DEFAULT_MARKUP};

/// Offline config rooted at `data_dir`: no store credentials, optional feed.
pub(crate) fn test_config(data_dir: &Path, feed_url: Option<String>) -> AppConfig {
    AppConfig {
        env: Environment::Test,
        log_level: "info".to_owned(),
        data_dir: data_dir.to_path_buf(),
        shopify_access_token: None,
        shopify_store: None,
        shopify_api_version: "2024-04".to_owned(),
        shopify_location_id: None,
        feed_url,
        price_markup: DEFAULT_MARKUP,
        request_timeout_secs: 5,
        user_agent: "feedsync-test/0.1".to_owned(),
        max_retries: 0,
        retry_backoff_base_secs: 1,
        catalog_page_size: 250,
        update_batch_size: 100,
        batch_delay_ms: 0,
    }
}
