//! Retry executor with per-attempt timeouts and pluggable backoff
//!
//! An operation is attempted up to `max_retries + 1` times. Every attempt
//! runs under its own timeout; an attempt that overruns is abandoned and
//! surfaces as the operation's own error type through
//! `From<AttemptTimedOut>`. Between attempts the [`RetryPolicy`] decides
//! whether to go on, and the [`BackoffStrategy`] decides how long to wait.
//!
//! Errors are never wrapped: when the executor gives up, the caller receives
//! the last error the operation produced.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, instrument, warn};

pub use crate::error::AttemptTimedOut;
use crate::error::ErrorClassification;

/// Invalid retry configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetryConfigError {
    /// A `Schedule` backoff needs at least one delay
    #[error("backoff schedule must contain at least one delay")]
    EmptySchedule,

    /// Exponential growth needs a positive base
    #[error("exponential base must be greater than 0, got {base}")]
    InvalidBase { base: f64 },

    /// A zero attempt timeout would fail every attempt
    #[error("attempt timeout must be greater than zero")]
    ZeroAttemptTimeout,
}

/// Outcome of a retry execution including result and summary statistics.
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: Result<T, E>,
    /// Attempts made, including the first one
    pub attempts: u32,
    /// Time spent sleeping between attempts
    pub total_delay: Duration,
}

impl<T, E> RetryOutcome<T, E> {
    /// Consume the outcome and return only the result.
    pub fn into_result(self) -> Result<T, E> {
        self.result
    }

    /// Number of retries after the first attempt
    pub fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }

    /// Get the average delay between attempts
    pub fn average_delay(&self) -> Duration {
        match self.retries() {
            0 => Duration::ZERO,
            retries => self.total_delay / retries,
        }
    }
}

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// Decide what to do after failed attempt `attempt` (0-based)
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the operation with the default backoff delay
    Retry,
    /// Retry the operation with a custom delay
    RetryAfter(Duration),
    /// Don't retry the operation
    Stop,
}

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// Exponential backoff: initial_delay * base^attempt, capped at max_delay
    Exponential { initial_delay: Duration, base: f64, max_delay: Duration },
    /// Explicit delays; attempts past the end reuse the last one
    Schedule(Vec<Duration>),
}

impl BackoffStrategy {
    /// The 1s, 2s, 4s schedule used for network requests
    pub fn request_schedule() -> Self {
        Self::Schedule(vec![
            Duration::from_millis(1000),
            Duration::from_millis(2000),
            Duration::from_millis(4000),
        ])
    }

    /// Calculate the delay after failed attempt `attempt` (0-based)
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed(delay) => *delay,
            BackoffStrategy::Exponential { initial_delay, base, max_delay } => {
                let delay = initial_delay.as_millis() as f64 * base.powi(attempt as i32);
                let delay_ms = delay.min(max_delay.as_millis() as f64) as u64;
                Duration::from_millis(delay_ms)
            }
            BackoffStrategy::Schedule(delays) => {
                let index = (attempt as usize).min(delays.len().saturating_sub(1));
                delays.get(index).copied().unwrap_or(Duration::ZERO)
            }
        }
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retries after the first attempt; total attempts = `max_retries + 1`
    pub max_retries: u32,
    /// Backoff strategy for calculating delays
    pub backoff: BackoffStrategy,
    /// Limit for each individual attempt; `None` waits indefinitely
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: BackoffStrategy::request_schedule(),
            attempt_timeout: Some(Duration::from_secs(10)),
        }
    }
}

impl RetryConfig {
    /// Create a configuration builder
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RetryConfigError> {
        match &self.backoff {
            BackoffStrategy::Schedule(delays) if delays.is_empty() => {
                return Err(RetryConfigError::EmptySchedule);
            }
            BackoffStrategy::Exponential { base, .. } if *base <= 0.0 => {
                return Err(RetryConfigError::InvalidBase { base: *base });
            }
            _ => {}
        }

        if self.attempt_timeout == Some(Duration::ZERO) {
            return Err(RetryConfigError::ZeroAttemptTimeout);
        }

        Ok(())
    }
}

/// Builder for RetryConfig with fluent API
#[derive(Debug, Default)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn fixed_backoff(mut self, delay: Duration) -> Self {
        self.config.backoff = BackoffStrategy::Fixed(delay);
        self
    }

    pub fn exponential_backoff(
        mut self,
        initial_delay: Duration,
        base: f64,
        max_delay: Duration,
    ) -> Self {
        self.config.backoff = BackoffStrategy::Exponential { initial_delay, base, max_delay };
        self
    }

    pub fn schedule_backoff(mut self, delays: Vec<Duration>) -> Self {
        self.config.backoff = BackoffStrategy::Schedule(delays);
        self
    }

    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.config.attempt_timeout = Some(timeout);
        self
    }

    pub fn no_attempt_timeout(mut self) -> Self {
        self.config.attempt_timeout = None;
        self
    }

    pub fn build(self) -> Result<RetryConfig, RetryConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// The main retry executor
#[derive(Debug, Clone)]
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
}

impl<P> RetryExecutor<P> {
    /// Create a new retry executor with the given configuration and policy
    pub fn new(config: RetryConfig, policy: P) -> Self {
        Self { config, policy }
    }

    /// Create with default configuration
    pub fn with_policy(policy: P) -> Self {
        Self::new(RetryConfig::default(), policy)
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Execute an operation with retry logic
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Debug + From<AttemptTimedOut>,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute_with_outcome(operation).await.into_result()
    }

    /// Execute an operation with retry logic and return outcome statistics.
    #[instrument(
        skip(self, operation),
        fields(max_retries = self.config.max_retries, attempt_timeout = ?self.config.attempt_timeout)
    )]
    pub async fn execute_with_outcome<F, Fut, T, E>(&self, mut operation: F) -> RetryOutcome<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Debug + From<AttemptTimedOut>,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.config.max_retries.saturating_add(1);
        let mut attempt: u32 = 0;
        let mut total_delay = Duration::ZERO;

        loop {
            let attempt_number = attempt + 1;
            debug!("Executing operation (attempt {}/{})", attempt_number, max_attempts);

            let result = match self.config.attempt_timeout {
                Some(limit) => match tokio::time::timeout(limit, operation()).await {
                    Ok(result) => result,
                    Err(_) => Err(E::from(AttemptTimedOut { timeout: limit })),
                },
                None => operation().await,
            };

            let error = match result {
                Ok(value) => {
                    if attempt > 0 {
                        debug!("Operation succeeded after {} retries", attempt);
                    }
                    return RetryOutcome { result: Ok(value), attempts: attempt_number, total_delay };
                }
                Err(error) => error,
            };

            if attempt >= self.config.max_retries {
                warn!(
                    "All retry attempts exhausted after {} tries, last error: {:?}",
                    attempt_number, error
                );
                return RetryOutcome { result: Err(error), attempts: attempt_number, total_delay };
            }

            let delay = match self.policy.should_retry(&error, attempt) {
                RetryDecision::Stop => {
                    debug!("Retry policy determined not to retry: {:?}", error);
                    return RetryOutcome {
                        result: Err(error),
                        attempts: attempt_number,
                        total_delay,
                    };
                }
                RetryDecision::Retry => self.config.backoff.calculate_delay(attempt),
                RetryDecision::RetryAfter(custom_delay) => custom_delay,
            };

            warn!(
                "Operation failed (attempt {}): {:?}, retrying after {:?}",
                attempt_number, error, delay
            );
            tokio::time::sleep(delay).await;
            total_delay += delay;
            attempt += 1;
        }
    }
}

/// Pre-defined retry policies for common scenarios
pub mod policies {
    use super::*;

    /// Always retry policy - retries on any error
    #[derive(Debug, Clone, Copy, Default)]
    pub struct AlwaysRetry;

    impl<E> RetryPolicy<E> for AlwaysRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Retry
        }
    }

    /// Never retry policy - never retries
    #[derive(Debug, Clone, Copy, Default)]
    pub struct NeverRetry;

    impl<E> RetryPolicy<E> for NeverRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Stop
        }
    }

    /// Predicate-based retry policy
    #[derive(Debug, Clone)]
    pub struct PredicateRetry<F> {
        predicate: F,
    }

    impl<F> PredicateRetry<F> {
        pub fn new(predicate: F) -> Self {
            Self { predicate }
        }
    }

    impl<F, E> RetryPolicy<E> for PredicateRetry<F>
    where
        F: Fn(&E, u32) -> bool,
    {
        fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision {
            if (self.predicate)(error, attempt) {
                RetryDecision::Retry
            } else {
                RetryDecision::Stop
            }
        }
    }

    /// Retries whatever the error classifies as retryable
    ///
    /// A `retry_after` hint on the error replaces the backoff delay.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct Classified;

    impl<E> RetryPolicy<E> for Classified
    where
        E: ErrorClassification,
    {
        fn should_retry(&self, error: &E, _attempt: u32) -> RetryDecision {
            if !error.is_retryable() {
                return RetryDecision::Stop;
            }
            match error.retry_after() {
                Some(delay) => RetryDecision::RetryAfter(delay),
                None => RetryDecision::Retry,
            }
        }
    }
}
