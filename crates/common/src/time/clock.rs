use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Source of monotonic time for expiry and latency measurement
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

/// `std::time::Instant::now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock backed by `tokio::time::Instant`
///
/// Behaves like [`SystemClock`] on a normal runtime. Under a paused runtime
/// (`#[tokio::test(start_paused = true)]`) it moves together with
/// `tokio::time::sleep`, which keeps cache expiry and backoff delays on the
/// same timeline. Outside a runtime it falls back to real time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Manually advanced clock for tests
///
/// Clones share the same offset, so a test can hand one clone to a cache
/// and advance the other.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl MockClock {
    /// Clock frozen at the current instant
    pub fn new() -> Self {
        Self { start: Instant::now(), offset: Arc::new(Mutex::new(Duration::ZERO)) }
    }

    pub fn advance(&self, duration: Duration) {
        *self.offset.lock() += duration;
    }

    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Jump to `offset` past the start, forwards or backwards
    pub fn set_elapsed(&self, offset: Duration) {
        *self.offset.lock() = offset;
    }

    /// Total offset from the start
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for time::clock.
    use super::*;

    /// Validates `MockClock::advance` behavior for the mock clock advance
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms the instant moved by exactly the advanced amount.
    /// - Confirms `clock.elapsed()` equals `Duration::from_millis(1500)`.
    #[test]
    fn test_mock_clock_advance() {
        let clock = MockClock::new();
        let start = clock.now();

        clock.advance(Duration::from_secs(1));
        clock.advance_millis(500);

        assert_eq!(clock.now().duration_since(start), Duration::from_millis(1500));
        assert_eq!(clock.elapsed(), Duration::from_millis(1500));
    }

    /// Validates that clones of a `MockClock` observe the same timeline.
    ///
    /// Assertions:
    /// - Confirms `other.now()` equals `clock.now()` after advancing `clock`.
    #[test]
    fn test_mock_clock_clones_share_time() {
        let clock = MockClock::new();
        let other = clock.clone();

        clock.advance(Duration::from_secs(42));

        assert_eq!(other.now(), clock.now());
        assert_eq!(other.elapsed(), Duration::from_secs(42));
    }

    /// Validates `MockClock::set_elapsed` for the rewind scenario.
    #[test]
    fn test_mock_clock_set_elapsed() {
        let clock = MockClock::new();
        clock.advance(Duration::from_secs(10));
        clock.set_elapsed(Duration::from_secs(3));
        assert_eq!(clock.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_follows_paused_time() {
        let clock = TokioClock;
        let start = clock.now();

        tokio::time::sleep(Duration::from_secs(30)).await;

        assert!(clock.now().duration_since(start) >= Duration::from_secs(30));
    }
}
