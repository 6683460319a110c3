use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::app_config::{AppConfig, Environment};
use crate::pricing::DEFAULT_MARKUP;
use crate::ConfigError;

/// Shopify caps `first:` on connection queries at 250.
const MAX_SHOPIFY_PAGE_SIZE: u64 = 250;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Credentials and URLs are optional here; each stage asks for the ones it
/// needs through the `AppConfig::require_*` accessors, so the offline stages
/// run without Shopify credentials.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default =
        |var: &str, default: &str| -> String { optional(var).unwrap_or_else(|| default.to_string()) };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_num = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_page_size = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let value = parse_num(var, default)?;
        if value == 0 || value > MAX_SHOPIFY_PAGE_SIZE {
            return Err(invalid(
                var,
                format!("must be between 1 and {MAX_SHOPIFY_PAGE_SIZE}, got {value}"),
            ));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("FEEDSYNC_ENV", "development"))?;
    let log_level = or_default("FEEDSYNC_LOG_LEVEL", "info");
    let data_dir = PathBuf::from(or_default("FEEDSYNC_DATA_DIR", "."));

    let shopify_access_token = optional("SHOPIFY_ACCESS_TOKEN");
    let shopify_store = optional("FEEDSYNC_SHOPIFY_STORE");
    let shopify_api_version = or_default("FEEDSYNC_SHOPIFY_API_VERSION", "2024-01");
    let shopify_location_id = optional("FEEDSYNC_SHOPIFY_LOCATION_ID");
    let feed_url = optional("FEEDSYNC_FEED_URL");

    let price_markup = match optional("FEEDSYNC_PRICE_MARKUP") {
        Some(raw) => parse_markup(&raw)?,
        None => DEFAULT_MARKUP,
    };

    let request_timeout_secs = parse_num("FEEDSYNC_REQUEST_TIMEOUT_SECS", "60")?;
    let user_agent = or_default("FEEDSYNC_USER_AGENT", "feedsync/0.1 (catalog-sync)");
    let max_retries = u32::try_from(parse_num("FEEDSYNC_MAX_RETRIES", "0")?)
        .map_err(|e| invalid("FEEDSYNC_MAX_RETRIES", e.to_string()))?;
    let retry_backoff_base_secs = parse_num("FEEDSYNC_RETRY_BACKOFF_BASE_SECS", "5")?;

    // Both values are bounded by MAX_SHOPIFY_PAGE_SIZE, so the narrowing is lossless.
    let catalog_page_size = u32::try_from(parse_page_size("FEEDSYNC_CATALOG_PAGE_SIZE", "250")?)
        .map_err(|e| invalid("FEEDSYNC_CATALOG_PAGE_SIZE", e.to_string()))?;
    let update_batch_size = usize::try_from(parse_page_size("FEEDSYNC_UPDATE_BATCH_SIZE", "100")?)
        .map_err(|e| invalid("FEEDSYNC_UPDATE_BATCH_SIZE", e.to_string()))?;
    let batch_delay_ms = parse_num("FEEDSYNC_BATCH_DELAY_MS", "500")?;

    Ok(AppConfig {
        env,
        log_level,
        data_dir,
        shopify_access_token,
        shopify_store,
        shopify_api_version,
        shopify_location_id,
        feed_url,
        price_markup,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
        catalog_page_size,
        update_batch_size,
        batch_delay_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "FEEDSYNC_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

/// Parse the markup multiplier. Must be a strictly positive decimal.
fn parse_markup(raw: &str) -> Result<Decimal, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "FEEDSYNC_PRICE_MARKUP".to_string(),
        reason,
    };
    let markup = Decimal::from_str(raw).map_err(|e| invalid(e.to_string()))?;
    if markup <= Decimal::ZERO {
        return Err(invalid(format!("must be greater than zero, got {markup}")));
    }
    Ok(markup)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
