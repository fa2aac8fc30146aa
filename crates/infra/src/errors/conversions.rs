//! Conversions from external infrastructure errors into domain errors.

use optiq_domain::{FetchError, OptiqError};
use reqwest::Error as HttpError;

/// Makes the conversion from a foreign error explicit at the call site.
pub(crate) trait IntoFetchError {
    fn into_fetch_error(self) -> FetchError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → FetchError */
/* -------------------------------------------------------------------------- */

impl IntoFetchError for HttpError {
    fn into_fetch_error(self) -> FetchError {
        if self.is_timeout() {
            return FetchError::new(
                optiq_domain::ErrorKind::Timeout,
                format!("HTTP request timed out: {self}"),
            );
        }

        if self.is_decode() {
            return FetchError::decode(format!("Failed to read response body: {self}"));
        }

        if let Some(status) = self.status() {
            let reason = status.canonical_reason().unwrap_or("Unknown");
            return FetchError::http_status(status.as_u16(), reason);
        }

        if self.is_connect() {
            return FetchError::network(format!("HTTP connection failed: {self}"));
        }

        if self.is_builder() {
            return FetchError::network(format!("Invalid HTTP request: {self}"));
        }

        FetchError::network(format!("HTTP request failed: {self}"))
    }
}

/// Client construction failures are setup problems, not request failures.
pub(crate) fn client_build_error(err: &HttpError) -> OptiqError {
    OptiqError::Config(format!("Failed to build HTTP client: {err}"))
}
