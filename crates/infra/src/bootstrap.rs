//! Composition root
//!
//! Builds the one shared [`RequestCoordinator`] an application hands to
//! its consumers. Nothing here is global: call sites own the coordinator
//! and clone it where needed.

use std::sync::Arc;

use optiq_common::cache::{CacheConfig, EvictionPolicy};
use optiq_common::resilience::BackoffStrategy;
use optiq_core::{RequestCoordinator, RequestCoordinatorBuilder, Transport};
use optiq_domain::{EvictionMode, OptimizerConfig, Result};
use tracing::info;

use crate::http::HttpTransport;

/// Coordinator over an [`HttpTransport`] configured from `config`
///
/// # Errors
/// Returns `OptiqError::Config` if the configuration is invalid or the
/// HTTP client cannot be built.
pub fn build_coordinator(config: &OptimizerConfig) -> Result<RequestCoordinator> {
    config.validate()?;
    let transport = HttpTransport::from_settings(&config.http)?;

    info!(
        base_url = config.http.base_url.as_deref().unwrap_or("-"),
        cache_size = config.cache.max_size,
        eviction = ?config.cache.eviction,
        "Request coordinator ready"
    );
    Ok(coordinator_builder(config, Arc::new(transport)).build())
}

/// Builder preloaded with the cache, backoff and request defaults from
/// `config`, over any transport
pub fn coordinator_builder(
    config: &OptimizerConfig,
    transport: Arc<dyn Transport>,
) -> RequestCoordinatorBuilder {
    let eviction = match config.cache.eviction {
        EvictionMode::None => EvictionPolicy::None,
        EvictionMode::Lru => EvictionPolicy::Lru,
    };
    let cache = CacheConfig::builder()
        .max_size(config.cache.max_size)
        .default_ttl(config.cache.default_ttl)
        .eviction_policy(eviction)
        .build();

    RequestCoordinator::builder(transport)
        .cache_config(cache)
        .backoff(BackoffStrategy::Schedule(config.request.backoff.clone()))
        .default_options(config.request.options())
}
