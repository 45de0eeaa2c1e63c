use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::errors::{EcoError, EcoResult};
use crate::domain::models::RetryConfig;

/// Bounded retry with exponential backoff.
///
/// Only transient errors (see [`EcoError::is_transient`]) are retried;
/// authentication and response-shape errors fail on the first attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_backoff_ms: u64,
    max_backoff_ms: u64,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff_ms,
            max_backoff_ms,
        }
    }

    /// Single attempt, no retries.
    pub const fn none() -> Self {
        Self::new(0, 0, 0)
    }

    pub const fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            config.initial_backoff_ms,
            config.max_backoff_ms,
        )
    }

    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> EcoResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = EcoResult<T>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!(retries = attempt, "operation succeeded after retry");
                    }
                    return Ok(result);
                }
                Err(err) if self.should_retry(&err, attempt) => {
                    let backoff = self.calculate_backoff(attempt);
                    warn!(
                        attempt = attempt + 1,
                        backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "transient failure, retrying"
                    );
                    sleep(backoff).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// `min(initial * 2^attempt, max)`
    fn calculate_backoff(&self, attempt: u32) -> Duration {
        let backoff_ms = self
            .initial_backoff_ms
            .saturating_mul(2_u64.saturating_pow(attempt))
            .min(self.max_backoff_ms);

        Duration::from_millis(backoff_ms)
    }

    const fn should_retry(&self, error: &EcoError, attempt: u32) -> bool {
        attempt < self.max_retries && error.is_transient()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy::new(3, 1000, 5000);
        assert_eq!(policy.calculate_backoff(0), Duration::from_millis(1000));
        assert_eq!(policy.calculate_backoff(1), Duration::from_millis(2000));
        assert_eq!(policy.calculate_backoff(2), Duration::from_millis(4000));
        assert_eq!(policy.calculate_backoff(3), Duration::from_millis(5000));
    }

    #[tokio::test]
    async fn test_transport_error_retried_once() {
        let policy = RetryPolicy::new(1, 1, 1);
        let calls = AtomicU32::new(0);

        let result = policy
            .execute(|| {
                let first = calls.fetch_add(1, Ordering::SeqCst) == 0;
                async move {
                    if first {
                        Err(EcoError::TransportError("connection reset".into()))
                    } else {
                        Ok("ok")
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("ok"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let policy = RetryPolicy::new(1, 1, 1);
        let calls = AtomicU32::new(0);

        let result: EcoResult<()> = policy
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(EcoError::TransportError("HTTP 503".into())) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_schema_and_auth_errors_not_retried() {
        let policy = RetryPolicy::new(3, 1, 1);
        for err in [
            EcoError::AuthError("invalid x-api-key".into()),
            EcoError::SchemaViolation("overall".into()),
            EcoError::MalformedResponse("not json".into()),
        ] {
            let calls = AtomicU32::new(0);
            let result: EcoResult<()> = policy
                .execute(|| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    let err = err.clone();
                    async move { Err(err) }
                })
                .await;
            assert_eq!(result, Err(err));
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_none_is_single_attempt() {
        let calls = AtomicU32::new(0);
        let _: EcoResult<()> = RetryPolicy::none()
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(EcoError::TransportError("timeout".into())) }
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
