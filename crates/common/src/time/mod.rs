//! Time abstractions
//!
//! Everything in optiq that reasons about elapsed time (cache expiry,
//! response-time measurement) reads the time through a [`Clock`], so tests
//! can drive it deterministically:
//!
//! - [`SystemClock`]: real monotonic time
//! - [`TokioClock`]: tokio's clock, which honours `tokio::time::pause()`
//! - [`MockClock`]: manually advanced time
//!
//! ```rust
//! use std::time::Duration;
//!
//! use optiq_common::time::{Clock, MockClock};
//!
//! let clock = MockClock::new();
//! let start = clock.now();
//! clock.advance(Duration::from_secs(5));
//! assert_eq!(clock.now().duration_since(start), Duration::from_secs(5));
//! ```

mod clock;

pub use clock::{Clock, MockClock, SystemClock, TokioClock};
