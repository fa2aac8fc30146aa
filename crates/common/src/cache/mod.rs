//! Key/value cache with per-entry time-to-live
//!
//! The cache is the response store of the request coordinator, but nothing in
//! it knows about requests: keys and values are generic.
//!
//! # Features
//!
//! - **Thread-safe**: Uses `Arc<RwLock<>>` for safe concurrent access
//! - **Per-entry TTL**: Each `set` may carry its own lifetime
//! - **Lazy expiry**: Expired entries are dropped on lookup, or swept when the
//!   cache is full
//! - **Capacity policy**: Overflow tolerated by default, LRU eviction opt-in
//! - **Testable**: Clock abstraction for deterministic time-based testing
//!
//! # Examples
//!
//! ## Default cache
//! ```
//! use optiq_common::cache::{Cache, CacheConfig};
//!
//! let cache: Cache<String, i32> = Cache::new(CacheConfig::default());
//! cache.set("key".to_string(), 42);
//! assert_eq!(cache.get(&"key".to_string()), Some(42));
//! ```
//!
//! ## Custom Configuration with Builder
//! ```
//! use std::time::Duration;
//!
//! use optiq_common::cache::{Cache, CacheConfig, EvictionPolicy};
//!
//! let config = CacheConfig::builder()
//!     .max_size(500)
//!     .default_ttl(Duration::from_secs(1800))
//!     .eviction_policy(EvictionPolicy::Lru)
//!     .build();
//!
//! let cache: Cache<String, i32> = Cache::new(config);
//! cache.set_with_ttl("short".to_string(), 1, Duration::from_secs(5));
//! assert!(cache.has(&"short".to_string()));
//! ```
//!
//! ## Deterministic expiry in tests
//! ```
//! use std::time::Duration;
//!
//! use optiq_common::cache::{Cache, CacheConfig};
//! use optiq_common::time::MockClock;
//!
//! let clock = MockClock::new();
//! let cache: Cache<&str, u8, MockClock> = Cache::with_clock(CacheConfig::default(), clock.clone());
//! cache.set_with_ttl("k", 1, Duration::from_millis(1000));
//!
//! clock.advance_millis(1100);
//! assert_eq!(cache.get(&"k"), None);
//! ```

pub mod config;
pub mod core;
pub mod stats;

pub use config::{CacheConfig, CacheConfigBuilder, EvictionPolicy, DEFAULT_MAX_SIZE, DEFAULT_TTL};
pub use core::Cache;
pub use stats::CacheStats;
