//! Performance monitor for request calls
//!
//! Passively counts every completed call and keeps the response times of
//! calls that were not served from cache. Cache hits are counted but kept
//! out of the latency figures: they measure the cache, not the backend.
//!
//! ## Design
//! - Atomic counters for calls, hits, misses and errors
//! - Running sum of miss latencies for the all-time average
//! - **VecDeque ring buffer** of the most recent miss latencies for
//!   percentiles

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use optiq_domain::constants::LATENCY_SAMPLE_WINDOW;
use optiq_domain::PerformanceMetrics;
use parking_lot::Mutex;

/// Aggregates call outcomes into [`PerformanceMetrics`]
#[derive(Debug)]
pub struct PerformanceMonitor {
    api_calls: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    error_count: AtomicU64,
    /// Sum of miss response times in microseconds
    total_response_micros: AtomicU64,
    /// Most recent miss response times in microseconds
    samples: Mutex<VecDeque<u64>>,
    window: usize,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceMonitor {
    /// Monitor keeping the last `LATENCY_SAMPLE_WINDOW` latency samples
    pub fn new() -> Self {
        Self::with_window(LATENCY_SAMPLE_WINDOW)
    }

    /// Keep `window` latency samples for percentiles (at least one)
    pub fn with_window(window: usize) -> Self {
        let window = window.max(1);
        Self {
            api_calls: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
            total_response_micros: AtomicU64::new(0),
            samples: Mutex::new(VecDeque::with_capacity(window)),
            window,
        }
    }

    /// Record one completed call
    ///
    /// Every call counts towards `api_calls`, and towards exactly one of
    /// `cache_hits` / `cache_misses`. Only misses contribute a latency.
    pub fn record_api_call(&self, response_time: Duration, from_cache: bool, error_occurred: bool) {
        self.api_calls.fetch_add(1, Ordering::SeqCst);

        if error_occurred {
            self.error_count.fetch_add(1, Ordering::SeqCst);
        }

        if from_cache {
            self.cache_hits.fetch_add(1, Ordering::SeqCst);
            return;
        }

        let micros = u64::try_from(response_time.as_micros()).unwrap_or(u64::MAX);
        let mut samples = self.samples.lock();
        self.cache_misses.fetch_add(1, Ordering::SeqCst);
        let _ = self.total_response_micros.fetch_update(
            Ordering::SeqCst,
            Ordering::SeqCst,
            |total| Some(total.saturating_add(micros)),
        );

        samples.push_back(micros);
        if samples.len() > self.window {
            samples.pop_front();
        }
    }

    /// `cache_hits / (cache_hits + cache_misses)`, 0 with no calls
    pub fn cache_hit_rate(&self) -> f64 {
        let hits = self.cache_hits.load(Ordering::SeqCst);
        let misses = self.cache_misses.load(Ordering::SeqCst);
        ratio(hits, hits + misses)
    }

    /// `error_count / api_calls`, 0 with no calls
    pub fn error_rate(&self) -> f64 {
        ratio(self.error_count.load(Ordering::SeqCst), self.api_calls.load(Ordering::SeqCst))
    }

    /// Mean response time of non-cache calls, zero with no samples
    pub fn average_response_time(&self) -> Duration {
        let _samples = self.samples.lock();
        let misses = self.cache_misses.load(Ordering::SeqCst);
        if misses == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(self.total_response_micros.load(Ordering::SeqCst) / misses)
    }

    /// Snapshot of every counter and derived rate
    pub fn metrics(&self) -> PerformanceMetrics {
        // Holding the sample lock keeps misses, latency sum and samples
        // consistent with each other.
        let samples = self.samples.lock();

        let api_calls = self.api_calls.load(Ordering::SeqCst);
        let cache_hits = self.cache_hits.load(Ordering::SeqCst);
        let cache_misses = self.cache_misses.load(Ordering::SeqCst);
        let error_count = self.error_count.load(Ordering::SeqCst);
        let total_micros = self.total_response_micros.load(Ordering::SeqCst);

        let average_response_time_ms = if cache_misses == 0 {
            0.0
        } else {
            total_micros as f64 / cache_misses as f64 / 1000.0
        };

        let mut sorted: Vec<u64> = samples.iter().copied().collect();
        drop(samples);
        sorted.sort_unstable();

        PerformanceMetrics {
            api_calls,
            cache_hits,
            cache_misses,
            error_count,
            average_response_time_ms,
            error_rate: ratio(error_count, api_calls),
            cache_hit_rate: ratio(cache_hits, cache_hits + cache_misses),
            p50_response_time_ms: percentile_ms(&sorted, 0.50),
            p95_response_time_ms: percentile_ms(&sorted, 0.95),
        }
    }

    /// Zero every counter and drop all samples
    pub fn reset(&self) {
        let mut samples = self.samples.lock();
        samples.clear();
        self.api_calls.store(0, Ordering::SeqCst);
        self.cache_hits.store(0, Ordering::SeqCst);
        self.cache_misses.store(0, Ordering::SeqCst);
        self.error_count.store(0, Ordering::SeqCst);
        self.total_response_micros.store(0, Ordering::SeqCst);
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Nearest-rank percentile of an ascending slice, in milliseconds
fn percentile_ms(sorted: &[u64], percentile: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (sorted.len() as f64 * percentile).ceil() as usize;
    let index = rank.saturating_sub(1).min(sorted.len() - 1);
    Some(sorted[index] as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates every derived rate is zero before any call.
    #[test]
    fn test_empty_monitor() {
        let monitor = PerformanceMonitor::new();
        let metrics = monitor.metrics();

        assert_eq!(metrics, PerformanceMetrics::default());
        assert_eq!(monitor.cache_hit_rate(), 0.0);
        assert_eq!(monitor.error_rate(), 0.0);
        assert_eq!(monitor.average_response_time(), Duration::ZERO);
    }

    /// Validates `record_api_call` bookkeeping for a mix of calls.
    ///
    /// # Test Steps
    /// 1. Record two misses (100ms, 300ms), one of them failed
    /// 2. Record two cache hits with a 1ms latency each
    ///
    /// Assertions:
    /// - Confirms four calls, two hits, two misses and one error.
    /// - Confirms hit latencies are excluded from the 200ms average.
    /// - Confirms `error_rate` is 0.25 and `cache_hit_rate` is 0.5.
    #[test]
    fn test_record_api_call_mixed() {
        let monitor = PerformanceMonitor::new();

        monitor.record_api_call(Duration::from_millis(100), false, false);
        monitor.record_api_call(Duration::from_millis(300), false, true);
        monitor.record_api_call(Duration::from_millis(1), true, false);
        monitor.record_api_call(Duration::from_millis(1), true, false);

        let metrics = monitor.metrics();
        assert_eq!(metrics.api_calls, 4);
        assert_eq!(metrics.cache_hits, 2);
        assert_eq!(metrics.cache_misses, 2);
        assert_eq!(metrics.error_count, 1);
        assert_eq!(metrics.average_response_time_ms, 200.0);
        assert_eq!(metrics.error_rate, 0.25);
        assert_eq!(metrics.cache_hit_rate, 0.5);
        assert_eq!(monitor.average_response_time(), Duration::from_millis(200));
    }

    /// Validates percentiles over the sample window.
    ///
    /// Assertions:
    /// - Confirms p50 and p95 over 1..=100ms samples.
    /// - Confirms the window keeps only the most recent samples while the
    ///   average still covers all of them.
    #[test]
    fn test_percentiles_and_window() {
        let monitor = PerformanceMonitor::with_window(100);
        for ms in 1..=100 {
            monitor.record_api_call(Duration::from_millis(ms), false, false);
        }

        let metrics = monitor.metrics();
        assert_eq!(metrics.p50_response_time_ms, Some(50.0));
        assert_eq!(metrics.p95_response_time_ms, Some(95.0));

        for _ in 0..100 {
            monitor.record_api_call(Duration::from_millis(1000), false, false);
        }

        let metrics = monitor.metrics();
        assert_eq!(metrics.p50_response_time_ms, Some(1000.0));
        assert_eq!(metrics.cache_misses, 200);
        assert!((metrics.average_response_time_ms - 525.25).abs() < 1e-9);
    }

    /// Validates `reset` zeroes all state.
    #[test]
    fn test_reset() {
        let monitor = PerformanceMonitor::new();
        monitor.record_api_call(Duration::from_millis(5), false, true);
        monitor.record_api_call(Duration::ZERO, true, false);

        monitor.reset();

        assert_eq!(monitor.metrics(), PerformanceMetrics::default());
    }

    /// Validates a failed cache-miss call counts as both a miss and an
    /// error.
    #[test]
    fn test_error_only_call() {
        let monitor = PerformanceMonitor::new();
        monitor.record_api_call(Duration::from_millis(10), false, true);

        assert_eq!(monitor.error_rate(), 1.0);
        assert_eq!(monitor.cache_hit_rate(), 0.0);
        assert_eq!(monitor.metrics().p95_response_time_ms, Some(10.0));
    }

    /// Validates the latency sum saturates instead of wrapping.
    #[test]
    fn test_latency_sum_saturates() {
        let monitor = PerformanceMonitor::new();
        monitor.record_api_call(Duration::MAX, false, false);
        monitor.record_api_call(Duration::from_millis(1), false, false);

        assert_eq!(monitor.average_response_time(), Duration::from_micros(u64::MAX / 2));
        assert!(monitor.metrics().average_response_time_ms > 1e12);
    }

    /// Validates nearest-rank selection on a small window.
    #[test]
    fn test_percentile_nearest_rank() {
        assert_eq!(percentile_ms(&[], 0.5), None);
        assert_eq!(percentile_ms(&[1000, 2000, 3000, 4000], 0.50), Some(2.0));
        assert_eq!(percentile_ms(&[1000, 2000, 3000, 4000], 0.95), Some(4.0));
        assert_eq!(percentile_ms(&[7000], 0.0), Some(7.0));
    }
}
