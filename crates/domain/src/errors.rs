//! Error types used throughout optiq
//!
//! Two families:
//! - [`FetchError`]: the outcome of a failed logical request. It is `Clone`
//!   because one execution's result is handed to every caller that attached
//!   to it.
//! - [`OptiqError`]: setup failures (configuration, client construction).

use std::fmt;
use std::time::Duration;

use optiq_common::error::{AttemptTimedOut, ErrorClassification, ErrorSeverity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What went wrong with a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "status")]
pub enum ErrorKind {
    /// HTTP 4xx; fatal, never retried
    ClientError(u16),
    /// Any other non-success status; transient
    ServerError(u16),
    /// An attempt exceeded its time limit; transient
    Timeout,
    /// The request never produced a response; transient
    NetworkFailure,
    /// The response body could not be decoded; transient
    Decode,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientError(status) => write!(f, "client error ({status})"),
            Self::ServerError(status) => write!(f, "server error ({status})"),
            Self::Timeout => write!(f, "timeout"),
            Self::NetworkFailure => write!(f, "network failure"),
            Self::Decode => write!(f, "decode error"),
        }
    }
}

/// A failed request, surfaced to callers unchanged by retries
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct FetchError {
    pub kind: ErrorKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    /// Error for a non-success HTTP status, message `HTTP {status}: {reason}`
    ///
    /// 4xx maps to [`ErrorKind::ClientError`]; every other status maps to
    /// [`ErrorKind::ServerError`].
    pub fn http_status(status: u16, reason: &str) -> Self {
        let kind = if (400..500).contains(&status) {
            ErrorKind::ClientError(status)
        } else {
            ErrorKind::ServerError(status)
        };
        Self::new(kind, format!("HTTP {status}: {reason}"))
    }

    /// Attempt exceeded `limit`
    pub fn timeout(limit: Duration) -> Self {
        Self::new(ErrorKind::Timeout, format!("Request timed out after {}ms", limit.as_millis()))
    }

    /// Connection or transport failure
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NetworkFailure, message)
    }

    /// Body could not be decoded
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode, message)
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self.kind {
            ErrorKind::ClientError(status) | ErrorKind::ServerError(status) => Some(status),
            _ => None,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self.kind, ErrorKind::ClientError(_))
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::Timeout
    }
}

impl From<AttemptTimedOut> for FetchError {
    fn from(err: AttemptTimedOut) -> Self {
        Self::timeout(err.timeout)
    }
}

impl ErrorClassification for FetchError {
    fn is_retryable(&self) -> bool {
        match self.kind {
            ErrorKind::ServerError(_)
            | ErrorKind::Timeout
            | ErrorKind::NetworkFailure
            | ErrorKind::Decode => true,
            ErrorKind::ClientError(_) => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self.kind {
            ErrorKind::ClientError(_) | ErrorKind::Timeout | ErrorKind::NetworkFailure => {
                ErrorSeverity::Warning
            }
            ErrorKind::ServerError(_) | ErrorKind::Decode => ErrorSeverity::Error,
        }
    }
}

/// Setup error type for optiq
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum OptiqError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for optiq setup operations
pub type Result<T> = std::result::Result<T, OptiqError>;
