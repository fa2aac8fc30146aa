//! Cache statistics and metrics tracking

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

/// Point-in-time view of a cache
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats<K> {
    /// Current number of entries, live or not yet swept
    pub size: usize,

    /// Configured capacity
    pub max_size: usize,

    /// Keys currently stored, in no particular order
    pub keys: Vec<K>,

    /// Lookups that returned a live value
    pub hits: u64,

    /// Lookups that found nothing or an expired entry
    pub misses: u64,

    /// Total number of `set` operations
    pub inserts: u64,

    /// Live entries removed to respect `max_size`
    pub evictions: u64,

    /// Expired entries removed lazily or by a sweep
    pub expirations: u64,
}

impl<K> CacheStats<K> {
    /// Calculate hit rate (hits / total lookups), 0.0 when there were none
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_accesses();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Ratio of `size` to `max_size`; above 1.0 when overflow is tolerated
    pub fn fill_ratio(&self) -> f64 {
        if self.max_size == 0 {
            0.0
        } else {
            self.size as f64 / self.max_size as f64
        }
    }

    /// Total number of lookups (hits + misses)
    pub fn total_accesses(&self) -> u64 {
        self.hits + self.misses
    }
}

/// Lock-free counters shared by all clones of a cache
#[derive(Debug, Clone, Default)]
pub(crate) struct MetricsCollector {
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    inserts: Arc<AtomicU64>,
    evictions: Arc<AtomicU64>,
    expirations: Arc<AtomicU64>,
}

impl MetricsCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_expirations(&self, count: usize) {
        self.expirations.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot<K>(&self, size: usize, max_size: usize, keys: Vec<K>) -> CacheStats<K> {
        CacheStats {
            size,
            max_size,
            keys,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
        }
    }
}
