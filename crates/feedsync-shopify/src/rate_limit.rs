//! Retry with exponential backoff for transient Admin API failures.
//!
//! Retries are opt-in: with `max_retries = 0` every error propagates on the
//! first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::ShopifyError;

/// Returns `true` if `err` is transient and worth retrying after a delay.
///
/// Retriable:
/// - [`ShopifyError::RateLimited`]: HTTP 429.
/// - [`ShopifyError::Throttled`]: GraphQL query-cost budget exhausted.
/// - [`ShopifyError::Http`]: connection reset, timeout, and similar.
/// - [`ShopifyError::UnexpectedStatus`] with a 5xx status.
///
/// Everything else (4xx, GraphQL validation errors, bad JSON) is returned
/// immediately since a second attempt would get the same answer.
fn is_retriable(err: &ShopifyError) -> bool {
    match err {
        ShopifyError::RateLimited { .. }
        | ShopifyError::Throttled { .. }
        | ShopifyError::Http(_) => true,
        ShopifyError::UnexpectedStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

/// Runs `operation`, retrying transient errors up to `max_retries` times.
///
/// The wait before retry `n` (1-based) is `backoff_base_secs * 2^(n-1)`
/// seconds, or the server's `Retry-After` if that is longer.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ShopifyError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ShopifyError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }

        let mut delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        if let ShopifyError::RateLimited {
            retry_after_secs, ..
        } = &err
        {
            delay_secs = delay_secs.max(*retry_after_secs);
        }
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient Admin API error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
