//! Retry with exponential backoff for rate-limited backend calls.
//!
//! Only rate-limit failures are retried; every other error propagates
//! immediately. Malformed output in particular is never retried — callers
//! decide whether to retry the whole operation.

use notelink_core::{AppError, AppResult};
use std::future::Future;
use std::time::Duration;

/// Backoff policy for [`retry_with_backoff`].
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts
    pub max_retries: u32,

    /// Delay before the first retry; doubles on each subsequent retry
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

/// Run `operation`, retrying on rate-limit errors with exponential backoff.
///
/// The delay before retry `i` (0-indexed) is `initial_delay * 2^i`. No
/// jitter. After `max_retries` attempts the last rate-limit error
/// propagates. Non-rate-limit errors propagate immediately without retry.
pub async fn retry_with_backoff<T, F, Fut>(mut operation: F, policy: RetryPolicy) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let attempts = policy.max_retries.max(1);

    for attempt in 0..attempts {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_rate_limited() && attempt + 1 < attempts => {
                let delay = policy.initial_delay * 2u32.pow(attempt);
                tracing::warn!(
                    "Rate limited (attempt {}/{}), retrying in {:?}",
                    attempt + 1,
                    attempts,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }

    // Unreachable: the loop always returns on its final iteration
    Err(AppError::Other("retry loop exhausted".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            initial_delay: Duration::from_millis(10),
        }
    }

    #[tokio::test]
    async fn test_success_first_attempt() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, AppError>(42)
            },
            fast_policy(),
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_then_success() {
        // Fails with a rate-limit error twice, succeeds on the third attempt.
        // The two backoff delays are initial_delay and 2 * initial_delay.
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result = retry_with_backoff(
            || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(AppError::RateLimited("too many requests".to_string()))
                } else {
                    Ok("done")
                }
            },
            fast_policy(),
        )
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Delays were 10ms + 20ms
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_non_rate_limit_not_retried() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = retry_with_backoff(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AppError::Validation("length mismatch".to_string()))
            },
            fast_policy(),
        )
        .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_propagates_last_error() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = retry_with_backoff(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AppError::RateLimited("still limited".to_string()))
            },
            fast_policy(),
        )
        .await;

        assert!(matches!(result.unwrap_err(), AppError::RateLimited(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
