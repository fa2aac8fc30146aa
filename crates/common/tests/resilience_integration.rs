//! Integration tests for resilience module
//!
//! Tests the retry executor against an HTTP-shaped error type with status
//! classification, the request backoff schedule and per-attempt timeouts

#![cfg(feature = "runtime")]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use optiq_common::error::{ErrorClassification, ErrorSeverity};
use optiq_common::resilience::{policies, AttemptTimedOut, RetryConfig, RetryExecutor};

/// Custom error type for testing
#[derive(Debug, Clone, PartialEq, Eq)]
enum CallError {
    Status(u16),
    Network(String),
    Timeout,
}

impl From<AttemptTimedOut> for CallError {
    fn from(_: AttemptTimedOut) -> Self {
        Self::Timeout
    }
}

impl ErrorClassification for CallError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Status(code) => !(400..500).contains(code),
            Self::Network(_) | Self::Timeout => true,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }
}

fn request_executor(max_retries: u32) -> RetryExecutor<policies::Classified> {
    let config = RetryConfig::builder()
        .max_retries(max_retries)
        .build()
        .expect("Failed to build config");
    RetryExecutor::new(config, policies::Classified)
}

/// Validates the 1s/2s/4s schedule under paused time.
///
/// # Test Steps
/// 1. Configure 3 retries with the default schedule
/// 2. Fail every attempt with a 503
/// 3. Verify 4 attempts ran and the reported delay is 1s + 2s + 4s
/// 4. Verify virtual time advanced by the same amount
#[tokio::test(start_paused = true)]
async fn test_request_schedule_delays() {
    let executor = request_executor(3);
    let attempts = Arc::new(AtomicU32::new(0));
    let start = tokio::time::Instant::now();

    let outcome = executor
        .execute_with_outcome(|| {
            let attempts = Arc::clone(&attempts);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(CallError::Status(503))
            }
        })
        .await;

    assert_eq!(outcome.result, Err(CallError::Status(503)));
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
    assert_eq!(outcome.total_delay, Duration::from_secs(7));
    assert!(start.elapsed() >= Duration::from_secs(7));
}

/// Validates that a 4xx is fatal: one attempt, error propagated unchanged.
#[tokio::test(start_paused = true)]
async fn test_client_error_is_not_retried() {
    let executor = request_executor(2);
    let attempts = Arc::new(AtomicU32::new(0));

    let result: Result<(), CallError> = executor
        .execute(|| {
            let attempts = Arc::clone(&attempts);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(CallError::Status(400))
            }
        })
        .await;

    assert_eq!(result, Err(CallError::Status(400)));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

/// Validates recovery from two timed-out attempts.
///
/// # Test Steps
/// 1. Default config: retry 2, attempt timeout 10s
/// 2. Attempts 1 and 2 hang for a minute and are cut off
/// 3. Attempt 3 succeeds
/// 4. Verify the value and that time spent is 10 + 1 + 10 + 2 seconds
#[tokio::test(start_paused = true)]
async fn test_timeouts_then_success() {
    let executor = request_executor(2);
    let attempts = Arc::new(AtomicU32::new(0));
    let start = tokio::time::Instant::now();

    let result = executor
        .execute(|| {
            let attempts = Arc::clone(&attempts);
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                }
                Ok::<_, CallError>(serde_json::json!({"ok": true}))
            }
        })
        .await;

    assert_eq!(result, Ok(serde_json::json!({"ok": true})));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(23) && elapsed < Duration::from_secs(24));
}

/// Validates that the final error is the last cause, not the first.
#[tokio::test(start_paused = true)]
async fn test_last_error_is_propagated() {
    let executor = request_executor(2);
    let attempts = Arc::new(AtomicU32::new(0));

    let result: Result<(), CallError> = executor
        .execute(|| {
            let attempts = Arc::clone(&attempts);
            async move {
                match attempts.fetch_add(1, Ordering::SeqCst) {
                    0 => Err(CallError::Network("reset".into())),
                    1 => Err(CallError::Timeout),
                    _ => Err(CallError::Status(502)),
                }
            }
        })
        .await;

    assert_eq!(result, Err(CallError::Status(502)));
}

/// Validates the multi-threaded runtime path with real (short) delays.
#[tokio::test(flavor = "multi_thread")]
async fn test_retry_on_multi_thread_runtime() {
    let config = RetryConfig::builder()
        .max_retries(4)
        .exponential_backoff(Duration::from_millis(5), 2.0, Duration::from_millis(20))
        .attempt_timeout(Duration::from_secs(1))
        .build()
        .expect("Failed to build config");
    let executor = RetryExecutor::new(config, policies::AlwaysRetry);
    let attempts = Arc::new(AtomicU32::new(0));

    let result = executor
        .execute(|| {
            let attempts = Arc::clone(&attempts);
            async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                if n < 3 {
                    Err(CallError::Network(format!("attempt {n}")))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

    assert_eq!(result, Ok(3));
}
