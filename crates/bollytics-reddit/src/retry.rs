//! Retry with exponential back-off and jitter for listing fetches.

use std::future::Future;
use std::time::Duration;

use crate::error::RedditError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// Network failures, 5xx responses, 429s and a rejected cached token are
/// transient. Auth refusals, other statuses and malformed bodies are not.
pub(crate) fn is_retriable(err: &RedditError) -> bool {
    match err {
        RedditError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        RedditError::Unauthorized | RedditError::RateLimited { .. } => true,
        RedditError::UnexpectedStatus { status, .. } => *status >= 500,
        RedditError::Auth(_) | RedditError::Deserialize { .. } | RedditError::InvalidBaseUrl(_) => {
            false
        }
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// The delay doubles from `backoff_base_ms` with ±25 % jitter and is capped
/// at 60 s. A `Retry-After` hint on a 429 is honoured when it is longer.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, RedditError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RedditError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let jittered = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                let delay_ms = match &err {
                    RedditError::RateLimited {
                        retry_after_secs: Some(secs),
                    } => jittered.max(secs.saturating_mul(1_000).min(MAX_DELAY_MS)),
                    _ => jittered,
                };
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "Reddit transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
