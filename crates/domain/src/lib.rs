//! # Optiq Domain
//!
//! Value types shared by the request-optimization layer.
//!
//! This crate contains:
//! - Request descriptors, methods and per-request options
//! - The fetch error taxonomy and the setup error type
//! - Configuration structures
//! - Metrics snapshots
//!
//! ## Architecture
//! - Depends only on the foundation tier of `optiq-common`
//! - No I/O, no async runtime

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
