//! Modular common utilities shared across optiq crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: error classification, serde helpers
//! - `runtime`: async infrastructure (cache, time, resilience)
//! - `observability`: tracing instrumentation (pulled in by `runtime`)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;
#[cfg(feature = "foundation")]
pub mod utils;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod cache;
#[cfg(feature = "runtime")]
pub mod resilience;
#[cfg(feature = "runtime")]
pub mod time;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use cache::{Cache, CacheConfig, CacheConfigBuilder, CacheStats, EvictionPolicy};
#[cfg(feature = "foundation")]
pub use error::{AttemptTimedOut, ErrorClassification, ErrorSeverity};
#[cfg(feature = "runtime")]
pub use resilience::{
    policies, BackoffStrategy, RetryConfig, RetryConfigBuilder, RetryConfigError,
    RetryDecision, RetryExecutor, RetryOutcome, RetryPolicy,
};
#[cfg(feature = "runtime")]
pub use time::{Clock, MockClock, SystemClock, TokioClock};
#[cfg(feature = "foundation")]
pub use utils::serde::duration_millis;
