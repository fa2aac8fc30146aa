//! Domain types organized by concern

pub mod request;
pub mod stats;

pub use request::*;
pub use stats::*;
