//! Shared retry utilities for service operations.
//!
//! Both services reject over-limit traffic with HTTP 429. The policy here is
//! deliberately flat: wait a fixed delay and reissue the same request, up to
//! [`MAX_RATE_LIMIT_ATTEMPTS`] total attempts. Only rate-limit rejections are
//! retried; any other failure propagates to the caller on the first attempt.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backon::{ConstantBuilder, Retryable};

use crate::sync::progress::{ProgressCallback, SyncProgress};
use crate::sync::{MAX_RATE_LIMIT_ATTEMPTS, RATE_LIMIT_BACKOFF_MS};

/// Configuration for retry operations.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Delay between attempts.
    pub delay: Duration,
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(RATE_LIMIT_BACKOFF_MS),
            max_attempts: MAX_RATE_LIMIT_ATTEMPTS,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom values.
    #[must_use]
    pub fn new(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts,
        }
    }

    /// Build a constant backoff strategy from this configuration.
    #[must_use]
    pub fn into_backoff(self) -> ConstantBuilder {
        ConstantBuilder::default()
            .with_delay(self.delay)
            .with_max_times(self.max_attempts.saturating_sub(1) as usize)
    }
}

/// Build the default backoff strategy for service operations:
/// a fixed 1.2 second delay, five attempts in total.
#[must_use]
pub fn default_backoff() -> ConstantBuilder {
    RetryConfig::default().into_backoff()
}

/// Execute an operation, retrying on rate-limit rejections.
///
/// Used by both the fetch and create paths so rate-limit recovery behaves the
/// same everywhere:
/// - tracks the attempt count with an atomic counter
/// - sleeps the fixed backoff between attempts
/// - reports each backoff via the progress callback
/// - logs attempts with debug-level tracing
///
/// # Arguments
///
/// * `operation` - The async operation to retry.
/// * `is_rate_limit` - Predicate for "this error is a rate-limit rejection".
/// * `short_message` - Extracts a one-line error message for logging.
/// * `label` - What is being attempted, for progress and logs
///   (e.g. `"toggl clients page 2"`).
/// * `on_progress` - Optional progress callback.
pub async fn with_retry<T, E, F, Fut, IsRateLimit, ShortMsg>(
    mut operation: F,
    is_rate_limit: IsRateLimit,
    short_message: ShortMsg,
    label: &str,
    on_progress: Option<&ProgressCallback>,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
    IsRateLimit: Fn(&E) -> bool + Send + Sync + 'static,
    ShortMsg: Fn(&E) -> String + Send + Sync + 'static,
{
    let label_str = label.to_string();

    // Track attempt number for progress reporting
    let attempt = AtomicU32::new(0);

    let retry_op = || {
        attempt.fetch_add(1, Ordering::SeqCst);
        operation()
    };

    retry_op
        .retry(default_backoff())
        .notify(|err, dur| {
            let current_attempt = attempt.load(Ordering::SeqCst);
            if let Some(cb) = on_progress {
                cb(SyncProgress::RateLimitBackoff {
                    label: label_str.clone(),
                    retry_after_ms: dur.as_millis() as u64,
                    attempt: current_attempt,
                });
            }
            tracing::debug!(
                "Rate limited on {}, retrying in {:?} (attempt {}): {}",
                label_str,
                dur,
                current_attempt,
                short_message(err)
            );
        })
        .when(is_rate_limit)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();

        assert_eq!(config.delay, Duration::from_millis(RATE_LIMIT_BACKOFF_MS));
        assert_eq!(config.max_attempts, MAX_RATE_LIMIT_ATTEMPTS);
    }

    #[test]
    fn test_retry_config_custom() {
        let config = RetryConfig::new(Duration::from_secs(2), 3);

        assert_eq!(config.delay, Duration::from_secs(2));
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn test_default_backoff_creates_builder() {
        // Just verify it compiles and returns a ConstantBuilder
        let _backoff = default_backoff();
    }

    #[derive(Debug, Clone)]
    struct TestError {
        message: &'static str,
        rate_limited: bool,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.message)
        }
    }

    impl std::error::Error for TestError {}

    #[tokio::test(start_paused = true)]
    async fn with_retry_retries_rate_limit_errors_and_emits_progress() {
        use std::sync::atomic::AtomicU32;

        let calls = Arc::new(AtomicU32::new(0));

        let events: Arc<Mutex<Vec<SyncProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let events_capture = Arc::clone(&events);
        let callback: ProgressCallback = Box::new(move |event| {
            events_capture
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(event);
        });

        // Operation: fail twice with a rate-limit error, then succeed.
        let calls_capture = Arc::clone(&calls);
        let mut operation = move || {
            let calls_capture = Arc::clone(&calls_capture);
            async move {
                let n = calls_capture.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(TestError {
                        message: "rate limited",
                        rate_limited: true,
                    })
                } else {
                    Ok(42u32)
                }
            }
        };

        let advancer = tokio::spawn(async {
            // Advance time repeatedly so the backoff sleeps complete.
            for _ in 0..30 {
                tokio::time::advance(Duration::from_secs(2)).await;
                tokio::task::yield_now().await;
            }
        });

        let result = with_retry(
            &mut operation,
            |e: &TestError| e.rate_limited,
            |e: &TestError| e.to_string(),
            "toggl clients page 1",
            Some(&callback),
        )
        .await;

        advancer.await.expect("advancer task");

        assert_eq!(result.unwrap(), 42);
        assert!(calls.load(Ordering::SeqCst) >= 3);

        let events = events.lock().unwrap_or_else(|e| e.into_inner());
        assert!(
            events
                .iter()
                .any(|e| matches!(e, SyncProgress::RateLimitBackoff { .. }))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn with_retry_gives_up_after_max_attempts() {
        use std::sync::atomic::AtomicU32;

        let calls = Arc::new(AtomicU32::new(0));
        let calls_capture = Arc::clone(&calls);

        let mut operation = move || {
            let calls_capture = Arc::clone(&calls_capture);
            async move {
                calls_capture.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TestError {
                    message: "rate limited",
                    rate_limited: true,
                })
            }
        };

        let advancer = tokio::spawn(async {
            for _ in 0..30 {
                tokio::time::advance(Duration::from_secs(2)).await;
                tokio::task::yield_now().await;
            }
        });

        let err = with_retry(
            &mut operation,
            |e: &TestError| e.rate_limited,
            |e: &TestError| e.to_string(),
            "clockify projects page 1",
            None,
        )
        .await
        .expect_err("expected exhaustion");

        advancer.await.expect("advancer task");

        assert_eq!(err.to_string(), "rate limited");
        assert_eq!(calls.load(Ordering::SeqCst), MAX_RATE_LIMIT_ATTEMPTS);
    }

    #[tokio::test]
    async fn with_retry_does_not_retry_non_rate_limit_errors() {
        use std::sync::atomic::AtomicU32;

        let calls = Arc::new(AtomicU32::new(0));
        let calls_capture = Arc::clone(&calls);

        let mut operation = move || {
            let calls_capture = Arc::clone(&calls_capture);
            async move {
                calls_capture.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TestError {
                    message: "boom",
                    rate_limited: false,
                })
            }
        };

        let err = with_retry(
            &mut operation,
            |e: &TestError| e.rate_limited,
            |e: &TestError| e.to_string(),
            "toggl tags page 1",
            None,
        )
        .await
        .expect_err("expected error");

        assert_eq!(err.to_string(), "boom");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
