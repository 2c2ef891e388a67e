//! Retry with exponential backoff for idempotent API calls.
//!
//! Only provider search requests go through [`with_retry`]; downloads stay
//! single-attempt so a failing PDF is reported immediately.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::sources::SourceError;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles per attempt after that
    pub initial_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
        }
    }
}

/// Retry configuration for read-only provider API calls
pub fn api_retry_config() -> RetryConfig {
    RetryConfig::default()
}

/// Whether an error is worth retrying: connectivity failures, rate limiting
/// and server-side errors. Parse errors and 4xx responses are not.
fn is_transient(err: &SourceError) -> bool {
    match err {
        SourceError::Network(_) => true,
        SourceError::Api { status, .. } => *status == 429 || (500..=599).contains(status),
        SourceError::Parse(_) => false,
    }
}

/// Execute `operation` until it succeeds, fails with a permanent error, or
/// `config.max_attempts` is exhausted.
pub async fn with_retry<T, F, Fut>(config: RetryConfig, operation: F) -> Result<T, SourceError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut delay = config.initial_delay;
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if is_transient(&err) && attempt < config.max_attempts => {
                tracing::debug!(attempt, error = %err, "transient error, retrying");
                sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
