//! Bounded retry with exponential backoff for units of work.

use std::future::Future;
use std::time::Duration;

use crate::error::ServiceError;

/// How often, and how patiently, a unit of work is re-run after a
/// conflict or a transient store failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. At least 1.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Backoff before retry number `retry` (1-based), doubling up to the cap.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Runs `attempt` until it succeeds, fails with a non-retryable error,
    /// or the attempts run out. Each call must re-read everything it uses.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut attempt: F) -> Result<T, ServiceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let mut tries = 0;
        loop {
            tries += 1;
            match attempt().await {
                Err(err) if err.is_retryable() && tries < self.max_attempts => {
                    let delay = self.backoff(tries);
                    metrics::counter!("unit_of_work_retries_total", "operation" => operation)
                        .increment(1);
                    tracing::warn!(
                        operation,
                        attempt = tries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying unit of work"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) if err.is_retryable() => {
                    tracing::error!(operation, attempts = tries, error = %err, "giving up after retries");
                    return Err(err);
                }
                other => return other,
            }
        }
    }
}
