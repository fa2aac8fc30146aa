//! Network port.
//!
//! The coordinator never talks HTTP itself. It hands a
//! [`RequestDescriptor`] to a [`Transport`] and gets back the decoded JSON
//! body or a classified [`FetchError`].
//!
//! # Example
//!
//! ```no_run
//! use optiq_core::Transport;
//! use optiq_domain::RequestDescriptor;
//!
//! async fn ping(transport: &impl Transport) {
//!     match transport.send(&RequestDescriptor::get("/health")).await {
//!         Ok(body) => println!("healthy: {body}"),
//!         Err(err) => eprintln!("unhealthy: {err}"),
//!     }
//! }
//! ```

use async_trait::async_trait;
use optiq_domain::{FetchError, RequestDescriptor};
use serde_json::Value;

/// Port for performing a single network attempt.
///
/// Implementations perform exactly one attempt per call; retries and
/// timeouts are applied by the coordinator around it.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and decode the response body.
    ///
    /// # Errors
    ///
    /// - `ErrorKind::ClientError` / `ServerError` for non-success statuses,
    ///   with the message `HTTP {status}: {reason}`
    /// - `ErrorKind::NetworkFailure` when no response arrived
    /// - `ErrorKind::Decode` when the body is not valid JSON
    async fn send(&self, request: &RequestDescriptor) -> Result<Value, FetchError>;
}
