//! Resilience patterns for fault tolerance
//!
//! Provides the generic retry executor used by the request coordinator:
//! bounded attempts, a timeout per attempt, configurable backoff and a
//! pluggable decision of which errors are worth another try.
//!
//! The executor is generic over the operation's error type. It never wraps
//! errors, so whatever the operation returns last is what the caller sees.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use optiq_common::resilience::{policies::AlwaysRetry, AttemptTimedOut, RetryConfig, RetryExecutor};
//!
//! #[derive(Debug)]
//! struct Boom;
//!
//! impl From<AttemptTimedOut> for Boom {
//!     fn from(_: AttemptTimedOut) -> Self {
//!         Boom
//!     }
//! }
//!
//! let config = RetryConfig::builder()
//!     .max_retries(1)
//!     .fixed_backoff(Duration::from_millis(1))
//!     .build()
//!     .unwrap();
//! let executor = RetryExecutor::new(config, AlwaysRetry);
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let value = runtime.block_on(executor.execute(|| async { Ok::<_, Boom>(7) })).unwrap();
//! assert_eq!(value, 7);
//! ```

pub mod retry;

pub use retry::{
    policies, AttemptTimedOut, BackoffStrategy, RetryConfig, RetryConfigBuilder, RetryConfigError,
    RetryDecision, RetryExecutor, RetryOutcome, RetryPolicy,
};
