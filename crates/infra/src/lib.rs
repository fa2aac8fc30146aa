//! # Optiq Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The reqwest-backed [`HttpTransport`]
//! - Configuration loading from TOML/JSON files and the environment
//! - Tracing subscriber initialisation
//! - The composition root that wires a [`RequestCoordinator`] from config
//!
//! ## Architecture
//! - Implements traits defined in `optiq-core`
//! - Contains all "impure" code (network, filesystem, process environment)
//!
//! [`RequestCoordinator`]: optiq_core::RequestCoordinator

pub mod bootstrap;
pub mod config;
mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use bootstrap::{build_coordinator, coordinator_builder};
pub use http::{HttpTransport, HttpTransportBuilder};
pub use observability::init_tracing;
