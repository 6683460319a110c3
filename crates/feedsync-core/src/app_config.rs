use std::path::PathBuf;

use rust_decimal::Decimal;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub data_dir: PathBuf,
    pub shopify_access_token: Option<String>,
    pub shopify_store: Option<String>,
    pub shopify_api_version: String,
    pub shopify_location_id: Option<String>,
    pub feed_url: Option<String>,
    pub price_markup: Decimal,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub catalog_page_size: u32,
    pub update_batch_size: usize,
    pub batch_delay_ms: u64,
}

impl AppConfig {
    /// Returns the Admin API access token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `SHOPIFY_ACCESS_TOKEN` was not set.
    pub fn require_access_token(&self) -> Result<&str, ConfigError> {
        self.shopify_access_token
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("SHOPIFY_ACCESS_TOKEN".to_string()))
    }

    /// Returns the `*.myshopify.com` store domain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `FEEDSYNC_SHOPIFY_STORE` was not set.
    pub fn require_store(&self) -> Result<&str, ConfigError> {
        self.shopify_store
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("FEEDSYNC_SHOPIFY_STORE".to_string()))
    }

    /// Returns the inventory location ID that `push` writes quantities to.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `FEEDSYNC_SHOPIFY_LOCATION_ID` was not set.
    pub fn require_location_id(&self) -> Result<&str, ConfigError> {
        self.shopify_location_id
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("FEEDSYNC_SHOPIFY_LOCATION_ID".to_string()))
    }

    /// Returns the supplier feed URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `FEEDSYNC_FEED_URL` was not set.
    pub fn require_feed_url(&self) -> Result<&str, ConfigError> {
        self.feed_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("FEEDSYNC_FEED_URL".to_string()))
    }

    #[must_use]
    pub fn sku_cache_path(&self) -> PathBuf {
        self.data_dir.join("shop_skus.json")
    }

    #[must_use]
    pub fn delta_file_path(&self) -> PathBuf {
        self.data_dir.join("matrixify_delta_update.csv")
    }

    #[must_use]
    pub fn full_update_path(&self) -> PathBuf {
        self.data_dir.join("matrixify_update.csv")
    }

    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join("last_prices.csv")
    }

    #[must_use]
    pub fn reports_dir(&self) -> PathBuf {
        self.data_dir.join("reports")
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("data_dir", &self.data_dir)
            .field(
                "shopify_access_token",
                &self.shopify_access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("shopify_store", &self.shopify_store)
            .field("shopify_api_version", &self.shopify_api_version)
            .field("shopify_location_id", &self.shopify_location_id)
            .field("feed_url", &self.feed_url)
            .field("price_markup", &self.price_markup)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .field("catalog_page_size", &self.catalog_page_size)
            .field("update_batch_size", &self.update_batch_size)
            .field("batch_delay_ms", &self.batch_delay_ms)
            .finish()
    }
}
