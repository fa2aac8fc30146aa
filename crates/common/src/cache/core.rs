//! Core TTL cache implementation
//!
//! Every entry carries its own time-to-live. Staleness is enforced lazily:
//! `get` drops an expired entry when it finds one, and `set` sweeps all
//! expired entries once the cache reaches capacity. There is no background
//! sweeper.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use super::config::{CacheConfig, EvictionPolicy};
use super::stats::{CacheStats, MetricsCollector};
use crate::time::{Clock, SystemClock};

/// Entry stored in the cache with its expiry metadata
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    ttl: Duration,
    /// Logical access time, used by `EvictionPolicy::Lru`
    last_access: u64,
}

impl<V> CacheEntry<V> {
    /// An entry is live iff `now - inserted_at < ttl`
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) >= self.ttl
    }
}

#[derive(Debug)]
struct CacheStorage<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    tick: u64,
}

impl<K, V> CacheStorage<K, V>
where
    K: Eq + Hash,
{
    fn new() -> Self {
        Self { entries: HashMap::new(), tick: 0 }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Drop every expired entry, returning how many were removed
    fn sweep(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before - self.entries.len()
    }
}

/// Thread-safe key/value cache with per-entry TTL
///
/// Clones share the same storage and counters.
///
/// # Type Parameters
/// - `K`: Key type (must be `Eq + Hash + Clone`)
/// - `V`: Value type (must be `Clone`)
/// - `C`: Clock used for expiry (defaults to `SystemClock`)
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use optiq_common::cache::{Cache, CacheConfig};
///
/// let cache: Cache<String, i32> = Cache::new(CacheConfig::default());
/// cache.set_with_ttl("answer".to_string(), 42, Duration::from_secs(1));
/// assert_eq!(cache.get(&"answer".to_string()), Some(42));
/// ```
pub struct Cache<K, V, C = SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    storage: Arc<RwLock<CacheStorage<K, V>>>,
    config: CacheConfig,
    metrics: MetricsCollector,
    clock: C,
}

impl<K, V> Cache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a new cache with the given configuration using system clock
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<K, V, C> Cache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    /// Create a new cache with a custom clock (useful for testing)
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        Self {
            storage: Arc::new(RwLock::new(CacheStorage::new())),
            config,
            metrics: MetricsCollector::new(),
            clock,
        }
    }

    /// The configuration this cache was built with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Insert a value with the configured default TTL
    pub fn set(&self, key: K, value: V) {
        self.set_with_ttl(key, value, self.config.default_ttl);
    }

    /// Insert a value that expires `ttl` after now
    ///
    /// When the cache is at capacity, all expired entries are swept first.
    /// If it is still full and the key is new, `EvictionPolicy::None` lets
    /// the cache grow past `max_size` while `EvictionPolicy::Lru` evicts the
    /// least recently used entry. The whole sequence runs under one write
    /// lock.
    pub fn set_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let now = self.clock.now();
        let mut storage = self.storage.write();

        if storage.entries.len() >= self.config.max_size {
            let swept = storage.sweep(now);
            if swept > 0 {
                self.metrics.record_expirations(swept);
            }

            let is_new = !storage.entries.contains_key(&key);
            if is_new
                && self.config.eviction_policy == EvictionPolicy::Lru
                && storage.entries.len() >= self.config.max_size
            {
                self.evict_least_recent(&mut storage);
            }
        }

        let last_access = storage.next_tick();
        storage.entries.insert(key, CacheEntry { value, inserted_at: now, ttl, last_access });
        self.metrics.record_insert();
    }

    /// Get a live value
    ///
    /// Returns `None` if the key is absent. An expired entry is removed and
    /// also reported as `None`.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut storage = self.storage.write();

        let expired = match storage.entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => {
                self.metrics.record_miss();
                return None;
            }
        };

        if expired {
            storage.entries.remove(key);
            self.metrics.record_expirations(1);
            self.metrics.record_miss();
            return None;
        }

        let tick = storage.next_tick();
        let entry = storage.entries.get_mut(key)?;
        entry.last_access = tick;
        self.metrics.record_hit();
        Some(entry.value.clone())
    }

    /// Whether a live value exists; same semantics as `get(key).is_some()`
    pub fn has(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Remove an entry, returning whether one was stored
    pub fn delete(&self, key: &K) -> bool {
        self.storage.write().entries.remove(key).is_some()
    }

    /// Remove every entry whose key matches `predicate`
    ///
    /// Returns the number of entries removed.
    pub fn remove_where<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&K) -> bool,
    {
        let mut storage = self.storage.write();
        let before = storage.entries.len();
        storage.entries.retain(|key, _| !predicate(key));
        before - storage.entries.len()
    }

    /// Clear all entries; counters are kept
    pub fn clear(&self) {
        self.storage.write().entries.clear();
    }

    /// Current number of stored entries (expired ones included until swept)
    pub fn len(&self) -> usize {
        self.storage.read().entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove expired entries
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let removed = self.storage.write().sweep(now);
        if removed > 0 {
            self.metrics.record_expirations(removed);
        }
        removed
    }

    /// Size, capacity, stored keys and access counters
    pub fn stats(&self) -> CacheStats<K> {
        let storage = self.storage.read();
        let keys = storage.entries.keys().cloned().collect();
        self.metrics.snapshot(storage.entries.len(), self.config.max_size, keys)
    }

    fn evict_least_recent(&self, storage: &mut CacheStorage<K, V>) {
        let victim = storage
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(key, _)| key.clone());

        if let Some(key) = victim {
            storage.entries.remove(&key);
            self.metrics.record_eviction();
        }
    }
}

impl<V, C> Cache<String, V, C>
where
    V: Clone,
    C: Clock + Clone,
{
    /// Remove every entry whose key contains `pattern` as a substring
    pub fn remove_matching(&self, pattern: &str) -> usize {
        self.remove_where(|key| key.contains(pattern))
    }
}

impl<K, V, C> Clone for Cache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            config: self.config.clone(),
            metrics: self.metrics.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<K, V, C> std::fmt::Debug for Cache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("config", &self.config)
            .field("len", &self.storage.read().entries.len())
            .finish_non_exhaustive()
    }
}
