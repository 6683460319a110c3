//! HTTP client for the supplier's CSV feed.
//!
//! The feed is a single static URL serving the full catalog as CSV. The body
//! is downloaded whole and handed to [`crate::parse::parse_feed`]; there are
//! no retries, so any failure propagates to the caller.

use std::time::Duration;

use feedsync_core::FeedRecord;
use reqwest::{Client, Url};

use crate::error::FeedError;
use crate::parse::parse_feed;

/// Client for downloading the supplier feed.
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    /// Creates a client with the given request timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Downloads the raw feed body.
    ///
    /// # Errors
    ///
    /// - [`FeedError::InvalidUrl`] if `url` does not parse.
    /// - [`FeedError::UnexpectedStatus`] on any non-2xx response.
    /// - [`FeedError::Http`] on network failure or an unreadable body.
    pub async fn fetch_body(&self, url: &str) -> Result<String, FeedError> {
        let parsed = Url::parse(url).map_err(|e| FeedError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

        let response = self.client.get(parsed).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.text().await?;
        tracing::info!(url, bytes = body.len(), "downloaded supplier feed");
        Ok(body)
    }

    /// Downloads and parses the feed.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_body`] or
    /// [`crate::parse::parse_feed`].
    pub async fn fetch_records(&self, url: &str) -> Result<Vec<FeedRecord>, FeedError> {
        let body = self.fetch_body(url).await?;
        let records = parse_feed(&body)?;
        tracing::info!(records = records.len(), "loaded supplier feed");
        Ok(records)
    }
}
