//! Authenticated client for the Shopify Admin API.
//!
//! All catalog reads and writes go through [`AdminClient::graphql`], except
//! the REST catalog source which pages `products.json`.

mod catalog;
mod store_url;
mod update;

use std::time::Duration;

use feedsync_core::AppConfig;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::ShopifyError;
use crate::rate_limit::retry_with_backoff;
use crate::types::{GraphqlError, GraphqlResponse, RestProductsResponse};

pub use store_url::store_base_url;
pub use update::{ItemOutcome, UpdateItem, VariantHandle};

/// Maximum number of catalog pages before giving up. Guards against a cursor
/// that never reports the last page.
///
/// Each page may be retried, so the worst-case request count is
/// `MAX_PAGES * (1 + max_retries)`.
pub(crate) const MAX_PAGES: usize = 2000;

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Longest response body kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Shopify's leaky bucket refills within a couple of seconds.
const DEFAULT_RETRY_AFTER_SECS: u64 = 2;

/// Connection settings shared by every request.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_version: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first failure. `0` disables retries.
    pub max_retries: u32,
    /// Wait before retry `n` is `backoff_base_secs * 2^(n-1)` seconds.
    pub backoff_base_secs: u64,
}

impl ClientSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            api_version: config.shopify_api_version.clone(),
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            backoff_base_secs: config.retry_backoff_base_secs,
        }
    }
}

/// HTTP client for one store's Admin API.
///
/// 429 responses, GraphQL `THROTTLED` errors, 5xx and network failures are
/// retried with exponential backoff up to `max_retries` times.
pub struct AdminClient {
    client: Client,
    store: String,
    graphql_url: Url,
    products_url: Url,
    access_token: String,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl AdminClient {
    /// Creates a client for `store`, a bare `*.myshopify.com` host or a full
    /// base URL.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::InvalidStoreUrl`] if `store` is not a usable URL.
    /// - [`ShopifyError::Http`] if the underlying `reqwest::Client` cannot be
    ///   constructed.
    pub fn new(
        store: &str,
        access_token: &str,
        settings: &ClientSettings,
    ) -> Result<Self, ShopifyError> {
        let base_url = store_base_url(store)?;
        let endpoint = |name: &str| {
            base_url
                .join(&format!("admin/api/{}/{name}", settings.api_version))
                .map_err(|e| ShopifyError::InvalidStoreUrl {
                    store: store.to_owned(),
                    reason: e.to_string(),
                })
        };
        let graphql_url = endpoint("graphql.json")?;
        let products_url = endpoint("products.json")?;

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            store: store_url::store_host(&base_url),
            graphql_url,
            products_url,
            access_token: access_token.to_owned(),
            max_retries: settings.max_retries,
            backoff_base_secs: settings.backoff_base_secs,
        })
    }

    #[must_use]
    pub fn store(&self) -> &str {
        &self.store
    }

    #[must_use]
    pub fn graphql_url(&self) -> &Url {
        &self.graphql_url
    }

    /// Executes a GraphQL document and returns its `data`.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::RateLimited`]: HTTP 429 after all retries.
    /// - [`ShopifyError::UnexpectedStatus`]: any other non-2xx, with the body.
    /// - [`ShopifyError::Throttled`]: a `THROTTLED` GraphQL error after all
    ///   retries.
    /// - [`ShopifyError::Graphql`]: any other top-level `errors`, or no `data`.
    /// - [`ShopifyError::Deserialize`]: `data` does not match `T`.
    /// - [`ShopifyError::Http`]: network failure after all retries.
    pub async fn graphql<T: DeserializeOwned>(
        &self,
        context: &str,
        query: &str,
        variables: Value,
    ) -> Result<T, ShopifyError> {
        let payload = json!({ "query": query, "variables": variables });

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let payload = &payload;
            async move {
                let response = self
                    .client
                    .post(self.graphql_url.clone())
                    .header(ACCESS_TOKEN_HEADER, &self.access_token)
                    .json(payload)
                    .send()
                    .await?;
                let (body, _) = self.read_success(response, self.graphql_url.as_str()).await?;

                let parsed = serde_json::from_str::<GraphqlResponse<T>>(&body).map_err(|e| {
                    ShopifyError::Deserialize {
                        context: context.to_owned(),
                        source: e,
                    }
                })?;
                self.graphql_data(context, parsed)
            }
        })
        .await
    }

    /// Fetches one page of `products.json` (`id` and `variants` only) and
    /// returns it with the raw `Link` header.
    ///
    /// # Errors
    ///
    /// Same HTTP-level errors as [`Self::graphql`], plus
    /// [`ShopifyError::Deserialize`] if the body is not a products page.
    pub async fn fetch_products_page(
        &self,
        limit: u32,
        page_info: Option<&str>,
    ) -> Result<(RestProductsResponse, Option<String>), ShopifyError> {
        let url = self.products_page_url(limit, page_info);

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url.clone())
                    .header(ACCESS_TOKEN_HEADER, &self.access_token)
                    .send()
                    .await?;
                let (body, link_header) = self.read_success(response, url.as_str()).await?;

                let parsed = serde_json::from_str::<RestProductsResponse>(&body).map_err(|e| {
                    ShopifyError::Deserialize {
                        context: format!("products page from {}", self.store),
                        source: e,
                    }
                })?;
                Ok((parsed, link_header))
            }
        })
        .await
    }

    fn products_page_url(&self, limit: u32, page_info: Option<&str>) -> Url {
        let mut url = self.products_url.clone();
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("fields", "id,variants");
        if let Some(cursor) = page_info {
            url.query_pairs_mut().append_pair("page_info", cursor);
        }
        url
    }

    /// Maps 429 and other non-2xx statuses to errors; on success returns the
    /// body and the `Link` header.
    async fn read_success(
        &self,
        response: Response,
        url: &str,
    ) -> Result<(String, Option<String>), ShopifyError> {
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after)
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(ShopifyError::RateLimited {
                store: self.store.clone(),
                retry_after_secs,
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShopifyError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let link_header = response
            .headers()
            .get(reqwest::header::LINK)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.text().await?;
        Ok((body, link_header))
    }

    fn graphql_data<T>(
        &self,
        context: &str,
        response: GraphqlResponse<T>,
    ) -> Result<T, ShopifyError> {
        if !response.errors.is_empty() {
            let messages = response
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            if response.errors.iter().any(GraphqlError::is_throttled) {
                return Err(ShopifyError::Throttled {
                    store: self.store.clone(),
                    message: messages,
                });
            }
            return Err(ShopifyError::Graphql {
                context: context.to_owned(),
                messages,
            });
        }

        response.data.ok_or_else(|| ShopifyError::Graphql {
            context: context.to_owned(),
            messages: "response contained no data".to_owned(),
        })
    }
}

/// Shopify sends whole or fractional seconds (`"2.0"`).
fn parse_retry_after(value: &str) -> Option<u64> {
    let whole = value.trim().split('.').next()?;
    whole.parse().ok()
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
