//! Domain constants
//!
//! Defaults shared by request options and configuration.

// Request defaults
pub const DEFAULT_CACHE_TTL_MS: u64 = 5 * 60 * 1000;
pub const DEFAULT_RETRY_COUNT: u32 = 2;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_BACKOFF_SCHEDULE_MS: [u64; 3] = [1000, 2000, 4000];

// Shared response cache
pub const DEFAULT_SHARED_CACHE_SIZE: usize = 200;

// Performance monitor
pub const LATENCY_SAMPLE_WINDOW: usize = 1000;

// HTTP transport
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_USER_AGENT: &str = concat!("optiq/", env!("CARGO_PKG_VERSION"));
pub const CONTENT_TYPE_JSON: &str = "application/json";
