//! # Optiq Core
//!
//! Request-optimization logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - The [`RequestCoordinator`]: cache lookup, request coalescing, retries
//! - The [`PendingRegistry`] of in-flight executions
//! - The [`PerformanceMonitor`]
//! - The [`Transport`] port implemented by infrastructure adapters
//!
//! ## Architecture Principles
//! - Only depends on `optiq-common` and `optiq-domain`
//! - No HTTP code; the network is reached through [`Transport`]
//! - Time is read through an injected `Clock`

pub mod coordinator;
pub mod monitor;
pub mod pending;
pub mod ports;

pub use coordinator::{RequestCoordinator, RequestCoordinatorBuilder};
pub use monitor::PerformanceMonitor;
pub use pending::{FetchResult, PendingRegistry, PendingRequest};
pub use ports::Transport;
