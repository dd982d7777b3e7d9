//! Retry with exponential backoff and jitter.

use std::future::Future;
use std::time::Duration;

use crate::error::QuintetError;

/// Retry policy for collaborator calls (model, speech).
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(20),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Run `operation`, retrying transient failures.
    ///
    /// A `RateLimited` error carrying a server hint waits for that hint
    /// instead of the computed backoff.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, QuintetError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, QuintetError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut backoff = self.initial_backoff;
        let mut attempt = 1;

        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() || attempt >= attempts {
                return Err(err);
            }

            let wait = match &err {
                QuintetError::RateLimited {
                    retry_after_ms: Some(ms),
                } => Duration::from_millis(*ms).min(self.max_backoff),
                _ => jittered(backoff),
            };

            tracing::warn!(
                attempt,
                max_attempts = attempts,
                wait_ms = wait.as_millis() as u64,
                error = %err,
                "retrying after transient error"
            );

            tokio::time::sleep(wait).await;
            backoff = Duration::from_secs_f64(
                (backoff.as_secs_f64() * self.multiplier).min(self.max_backoff.as_secs_f64()),
            );
            attempt += 1;
        }
    }
}

/// Scale `base` into 75%–125% using the clock's sub-second noise.
fn jittered(base: Duration) -> Duration {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    let factor = 0.75 + f64::from(nanos % 1000) / 2000.0;
    Duration::from_secs_f64(base.as_secs_f64() * factor)
}
