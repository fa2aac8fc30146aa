//! Error classification shared by every optiq error type
//!
//! Concrete error enums live next to the code that produces them. What they
//! share is the [`ErrorClassification`] trait: a uniform way to ask whether an
//! error is transient (worth retrying) and how loudly it should be reported.
//! The retry executor's [`Classified`](crate::resilience::policies::Classified)
//! policy dispatches on it, so an error type opts into retry semantics by
//! implementing this trait instead of by having its message inspected.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use optiq_common::error::{ErrorClassification, ErrorSeverity};
//!
//! #[derive(Debug)]
//! enum WidgetError {
//!     Busy,
//!     Rejected,
//! }
//!
//! impl ErrorClassification for WidgetError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, Self::Busy)
//!     }
//!
//!     fn severity(&self) -> ErrorSeverity {
//!         match self {
//!             Self::Busy => ErrorSeverity::Warning,
//!             Self::Rejected => ErrorSeverity::Error,
//!         }
//!     }
//!
//!     fn retry_after(&self) -> Option<Duration> {
//!         None
//!     }
//! }
//!
//! assert!(WidgetError::Busy.is_retryable());
//! assert!(!WidgetError::Rejected.is_retryable());
//! ```

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Standard interface for classifying errors by their characteristics
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient issues that may succeed if attempted
    /// again, such as network failures, attempt timeouts or server-side
    /// (5xx) failures.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    ///
    /// Used for logging decisions.
    fn severity(&self) -> ErrorSeverity;

    /// Get the suggested retry delay if applicable
    ///
    /// `Some` overrides the configured backoff for the next attempt.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Marker produced when a single attempt exceeds its time limit
///
/// Operation error types implement `From<AttemptTimedOut>` so the retry
/// executor can report a timed-out attempt in the same type as every other
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("attempt timed out after {timeout:?}")]
pub struct AttemptTimedOut {
    /// The per-attempt limit that was exceeded
    pub timeout: Duration,
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
