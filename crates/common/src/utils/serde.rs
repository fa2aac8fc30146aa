//! Serialization helpers for configuration values
//!
//! Configuration files express every duration (cache TTLs, attempt
//! timeouts, backoff steps) as an integer number of milliseconds.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Serde adapter for `Duration` stored as milliseconds (u64)
///
/// # Usage
/// ```rust
/// use std::time::Duration;
///
/// use optiq_common::duration_millis;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Example {
///     #[serde(with = "duration_millis")]
///     timeout: Duration,
/// }
/// ```
pub mod duration_millis {
    use super::*;

    type SerializeResult<S> = Result<<S as Serializer>::Ok, <S as Serializer>::Error>;

    /// Serialize a Duration as milliseconds, saturating at `u64::MAX`
    pub fn serialize<S>(duration: &Duration, serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    /// Deserialize milliseconds into a Duration
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Serde adapter for `Vec<Duration>` stored as a list of milliseconds
///
/// Used for explicit backoff schedules such as `[1000, 2000, 4000]`.
pub mod duration_millis_vec {
    use super::*;

    type SerializeResult<S> = Result<<S as Serializer>::Ok, <S as Serializer>::Error>;

    /// Serialize each duration as milliseconds
    pub fn serialize<S>(durations: &[Duration], serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        serializer.collect_seq(
            durations.iter().map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
        )
    }

    /// Deserialize a list of milliseconds
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Vec::<u64>::deserialize(deserializer)?;
        Ok(millis.into_iter().map(Duration::from_millis).collect())
    }
}
