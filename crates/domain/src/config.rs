//! Configuration structures
//!
//! Every section and every field has a default, so an empty file (or no
//! file at all) yields a working configuration. Durations are written as
//! integer milliseconds.
//!
//! ```toml
//! [cache]
//! max_size = 500
//! default_ttl_ms = 60000
//! eviction = "lru"
//!
//! [request]
//! retry = 3
//! backoff_ms = [500, 1000, 2000]
//!
//! [http]
//! base_url = "https://api.example.com"
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use optiq_common::duration_millis;
use optiq_common::utils::serde::duration_millis_vec;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BACKOFF_SCHEDULE_MS, DEFAULT_CACHE_TTL_MS, DEFAULT_CONNECT_TIMEOUT_MS,
    DEFAULT_RETRY_COUNT, DEFAULT_SHARED_CACHE_SIZE, DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT,
};
use crate::errors::{OptiqError, Result};
use crate::types::RequestOptions;

/// Top-level configuration for the request optimizer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub cache: CacheSettings,
    pub request: RequestDefaults,
    pub http: HttpSettings,
    pub logging: LoggingConfig,
}

impl OptimizerConfig {
    /// Reject values that parse but cannot work
    ///
    /// # Errors
    /// Returns `OptiqError::Config` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.cache.max_size == 0 {
            return Err(OptiqError::Config("cache.max_size must be at least 1".to_string()));
        }
        if self.request.backoff.is_empty() {
            return Err(OptiqError::Config(
                "request.backoff_ms must contain at least one delay".to_string(),
            ));
        }
        if self.request.timeout.is_zero() {
            return Err(OptiqError::Config("request.timeout_ms must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// What the shared response cache does once full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionMode {
    /// Sweep expired entries only, tolerate overflow
    #[default]
    None,
    /// Evict the least recently used entry
    Lru,
}

/// Shared response cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub max_size: usize,

    /// TTL for entries stored without an explicit one
    #[serde(rename = "default_ttl_ms", with = "duration_millis")]
    pub default_ttl: Duration,

    pub eviction: EvictionMode,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_SHARED_CACHE_SIZE,
            default_ttl: Duration::from_millis(DEFAULT_CACHE_TTL_MS),
            eviction: EvictionMode::None,
        }
    }
}

/// Defaults applied to requests made without explicit options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestDefaults {
    #[serde(rename = "cache_ttl_ms", with = "duration_millis")]
    pub cache_ttl: Duration,

    pub retry: u32,

    #[serde(rename = "timeout_ms", with = "duration_millis")]
    pub timeout: Duration,

    /// Delay after failed attempt `k` is `backoff[min(k, len - 1)]`
    #[serde(rename = "backoff_ms", with = "duration_millis_vec")]
    pub backoff: Vec<Duration>,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_millis(DEFAULT_CACHE_TTL_MS),
            retry: DEFAULT_RETRY_COUNT,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            backoff: DEFAULT_BACKOFF_SCHEDULE_MS.iter().copied().map(Duration::from_millis).collect(),
        }
    }
}

impl RequestDefaults {
    /// Options for a request that did not specify its own
    pub fn options(&self) -> RequestOptions {
        RequestOptions {
            cache: None,
            cache_ttl: self.cache_ttl,
            retry: self.retry,
            timeout: self.timeout,
        }
    }
}

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Prefix joined onto relative request URLs
    pub base_url: Option<String>,

    #[serde(rename = "connect_timeout_ms", with = "duration_millis")]
    pub connect_timeout: Duration,

    pub user_agent: String,

    /// Sent with every request; per-request headers win on conflict
    pub default_headers: BTreeMap<String, String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_headers: BTreeMap::new(),
        }
    }
}

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Pretty }
    }
}
