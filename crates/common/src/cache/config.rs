//! Cache configuration types and builder patterns
//!
//! This module provides configuration types for customizing cache behavior:
//! capacity, the default time-to-live and what happens when the cache is
//! full.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default number of entries before `set` starts sweeping
pub const DEFAULT_MAX_SIZE: usize = 100;

/// TTL applied when `set` is called without one
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// What `set` does when the cache is still full after dropping expired
/// entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Never evict a live entry; the cache may grow past `max_size`
    #[default]
    None,
    /// Evict the least recently used live entry so `size <= max_size`
    Lru,
}

/// Configuration for cache behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Entry count at which `set` sweeps expired entries
    pub max_size: usize,

    /// Time-to-live for entries inserted without an explicit TTL
    pub default_ttl: Duration,

    /// Policy applied when the sweep frees no room
    pub eviction_policy: EvictionPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            default_ttl: DEFAULT_TTL,
            eviction_policy: EvictionPolicy::None,
        }
    }
}

impl CacheConfig {
    /// Create a new configuration builder
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Sweep-only cache holding `max_size` entries before it tolerates
    /// overflow
    ///
    /// # Example
    /// ```
    /// use optiq_common::cache::{CacheConfig, EvictionPolicy};
    ///
    /// let config = CacheConfig::with_max_size(200);
    /// assert_eq!(config.eviction_policy, EvictionPolicy::None);
    /// ```
    pub fn with_max_size(max_size: usize) -> Self {
        Self { max_size: max_size.max(1), ..Self::default() }
    }

    /// Hard-bounded cache that evicts the least recently used entry
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// use optiq_common::cache::CacheConfig;
    ///
    /// let config = CacheConfig::lru(1000, Duration::from_secs(60));
    /// assert_eq!(config.max_size, 1000);
    /// ```
    pub fn lru(max_size: usize, default_ttl: Duration) -> Self {
        Self { max_size: max_size.max(1), default_ttl, eviction_policy: EvictionPolicy::Lru }
    }
}

/// Builder for CacheConfig with fluent API
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the capacity; zero is raised to one
    pub fn max_size(mut self, size: usize) -> Self {
        self.config.max_size = size.max(1);
        self
    }

    /// Set the default time-to-live
    pub fn default_ttl(mut self, duration: Duration) -> Self {
        self.config.default_ttl = duration;
        self
    }

    /// Set eviction policy
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.config.eviction_policy = policy;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CacheConfig {
        self.config
    }
}
