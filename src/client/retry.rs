//! Retry with exponential backoff for transient management API failures.
//!
//! Only errors for which `ProviderError::is_transient` holds are retried;
//! everything else is returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::Result;

/// Backoff settings for a single request.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first (minimum 1)
    pub max_attempts: usize,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::with_attempts(3)
    }
}

impl RetryConfig {
    /// Standard backoff (250ms doubling, capped at 4s) with the given attempt count.
    #[must_use]
    pub fn with_attempts(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(4),
            factor: 2.0,
        }
    }

    /// No retries at all.
    #[must_use]
    pub fn none() -> Self {
        Self::with_attempts(1)
    }

    /// Fast retry for tests (minimal delays)
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
            factor: 2.0,
        }
    }
}

pub async fn retry<F, Fut, T>(operation_name: &str, config: &RetryConfig, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut delay = config.initial_delay;
    let mut attempts = 0;

    loop {
        match operation().await {
            Ok(val) => {
                if attempts > 0 {
                    info!("Request '{}' succeeded after {} retries", operation_name, attempts);
                }
                return Ok(val);
            }
            Err(err) => {
                attempts += 1;
                if !err.is_transient() || attempts >= config.max_attempts {
                    return Err(err);
                }

                warn!(
                    "Request '{}' failed (attempt {}/{}): {}. Retrying in {:?}...",
                    operation_name, attempts, config.max_attempts, err, delay
                );

                sleep(delay).await;
                delay = delay.mul_f64(config.factor).min(config.max_delay);
            }
        }
    }
}
