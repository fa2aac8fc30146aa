//! Request coordinator - cache, coalescing and retries around a transport
//!
//! For one logical request:
//! 1. A cacheable request (GET with caching on) is answered from the cache
//!    when a live entry exists.
//! 2. Otherwise the caller attaches to an identical in-flight execution, or
//!    starts one.
//! 3. The execution runs the transport through the retry executor, writes a
//!    successful cacheable result into the cache, then releases its
//!    registry slot.
//! 4. Every caller reports its own outcome and latency to the monitor.
//!
//! Errors reach the caller unchanged: retries only show up as latency.

use std::sync::Arc;

use optiq_common::cache::{Cache, CacheConfig, CacheStats};
use optiq_common::resilience::{policies, BackoffStrategy, RetryConfig, RetryExecutor};
use optiq_common::time::{Clock, TokioClock};
use optiq_domain::constants::DEFAULT_SHARED_CACHE_SIZE;
use optiq_domain::{FetchError, PerformanceMetrics, RequestDescriptor, RequestOptions};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::monitor::PerformanceMonitor;
use crate::pending::{FetchResult, PendingRegistry};
use crate::ports::Transport;

type ResponseCache = Cache<String, Value, Arc<dyn Clock>>;

struct Inner {
    transport: Arc<dyn Transport>,
    cache: ResponseCache,
    pending: PendingRegistry,
    monitor: Arc<PerformanceMonitor>,
    clock: Arc<dyn Clock>,
    defaults: RequestOptions,
    backoff: BackoffStrategy,
}

/// Entry point for optimized requests
///
/// Cheap to clone; clones share the cache, the registry and the monitor.
#[derive(Clone)]
pub struct RequestCoordinator {
    inner: Arc<Inner>,
}

impl RequestCoordinator {
    /// Coordinator with default settings around `transport`
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::builder(transport).build()
    }

    /// Builder starting from the default settings
    pub fn builder(transport: Arc<dyn Transport>) -> RequestCoordinatorBuilder {
        RequestCoordinatorBuilder::new(transport)
    }

    /// Options used by the convenience verbs
    pub fn default_options(&self) -> &RequestOptions {
        &self.inner.defaults
    }

    /// Perform a request and return the decoded JSON body
    ///
    /// # Errors
    ///
    /// Returns the final [`FetchError`] of the execution this call ran or
    /// attached to.
    #[instrument(skip(self, descriptor, options), fields(method = %descriptor.method, url = %descriptor.url))]
    pub async fn request_value(
        &self,
        descriptor: RequestDescriptor,
        options: RequestOptions,
    ) -> FetchResult {
        let inner = &self.inner;
        let started = inner.clock.now();
        let key = descriptor.cache_key();
        let cacheable = options.caches(descriptor.method);

        if cacheable {
            if let Some(value) = inner.cache.get(&key) {
                debug!(%key, "Served from cache");
                let elapsed = inner.clock.now().saturating_duration_since(started);
                inner.monitor.record_api_call(elapsed, true, false);
                return Ok(value);
            }
        }

        let pending = inner.pending.join_or_start(&key, || {
            execute(Arc::clone(inner), descriptor, options, key.clone(), cacheable)
        });
        if pending.is_attached() {
            debug!(%key, "Coalesced with in-flight request");
        }

        let result = pending.wait().await;
        let elapsed = inner.clock.now().saturating_duration_since(started);
        inner.monitor.record_api_call(elapsed, false, result.is_err());
        result
    }

    /// Perform a request and deserialize the body into `T`
    ///
    /// The JSON value is cached as received; a body that does not fit `T`
    /// yields `ErrorKind::Decode`. The mismatch is detected after the shared
    /// execution settled, so it is never retried.
    ///
    /// # Errors
    ///
    /// Returns the request's [`FetchError`], or a decode error.
    pub async fn request<T>(
        &self,
        descriptor: RequestDescriptor,
        options: RequestOptions,
    ) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
    {
        let value = self.request_value(descriptor, options).await?;
        serde_json::from_value(value).map_err(|err| FetchError::decode(err.to_string()))
    }

    /// GET with the default options (cached)
    pub async fn get(&self, url: impl Into<String>) -> FetchResult {
        let options = self.inner.defaults.clone();
        self.request_value(RequestDescriptor::get(url), options).await
    }

    /// GET with explicit options
    pub async fn get_with(&self, url: impl Into<String>, options: RequestOptions) -> FetchResult {
        self.request_value(RequestDescriptor::get(url), options).await
    }

    /// POST with the default options, never cached
    pub async fn post(&self, url: impl Into<String>, body: Value) -> FetchResult {
        let options = self.inner.defaults.clone();
        self.post_with(url, body, options).await
    }

    /// POST with explicit options; caching is always off
    pub async fn post_with(
        &self,
        url: impl Into<String>,
        body: Value,
        options: RequestOptions,
    ) -> FetchResult {
        self.request_value(RequestDescriptor::post(url, body), options.no_cache()).await
    }

    /// PUT with the default options
    pub async fn put(&self, url: impl Into<String>, body: Value) -> FetchResult {
        let options = self.inner.defaults.clone();
        self.request_value(RequestDescriptor::put(url, body), options).await
    }

    /// DELETE with the default options
    pub async fn delete(&self, url: impl Into<String>) -> FetchResult {
        let options = self.inner.defaults.clone();
        self.request_value(RequestDescriptor::delete(url), options).await
    }

    /// Drop cached responses whose key contains `pattern`, or all of them
    ///
    /// Returns how many entries were removed.
    pub fn invalidate_cache(&self, pattern: Option<&str>) -> usize {
        let removed = match pattern {
            Some(pattern) => self.inner.cache.remove_matching(pattern),
            None => {
                let removed = self.inner.cache.len();
                self.inner.cache.clear();
                removed
            }
        };
        info!(pattern = pattern.unwrap_or("*"), removed, "Invalidated cached responses");
        removed
    }

    /// Drop every cached response
    pub fn clear_cache(&self) {
        self.inner.cache.clear();
    }

    /// Snapshot of the response cache
    pub fn cache_stats(&self) -> CacheStats<String> {
        self.inner.cache.stats()
    }

    /// Snapshot of the performance counters
    pub fn metrics(&self) -> PerformanceMetrics {
        self.inner.monitor.metrics()
    }

    /// The monitor this coordinator reports to
    pub fn monitor(&self) -> &Arc<PerformanceMonitor> {
        &self.inner.monitor
    }

    /// Number of executions currently in flight
    pub fn pending_count(&self) -> usize {
        self.inner.pending.len()
    }
}

impl std::fmt::Debug for RequestCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestCoordinator")
            .field("cache", &self.inner.cache)
            .field("pending", &self.inner.pending)
            .field("defaults", &self.inner.defaults)
            .finish_non_exhaustive()
    }
}

/// The shared execution for one key
async fn execute(
    inner: Arc<Inner>,
    descriptor: RequestDescriptor,
    options: RequestOptions,
    key: String,
    cacheable: bool,
) -> FetchResult {
    let config = RetryConfig {
        max_retries: options.retry,
        backoff: inner.backoff.clone(),
        attempt_timeout: Some(options.timeout),
    };
    let executor = RetryExecutor::new(config, policies::Classified);

    let result = executor.execute(|| inner.transport.send(&descriptor)).await;

    if cacheable {
        if let Ok(value) = &result {
            inner.cache.set_with_ttl(key, value.clone(), options.cache_ttl);
        }
    }
    result
}

/// Builder for [`RequestCoordinator`]
pub struct RequestCoordinatorBuilder {
    transport: Arc<dyn Transport>,
    cache_config: CacheConfig,
    clock: Arc<dyn Clock>,
    monitor: Arc<PerformanceMonitor>,
    defaults: RequestOptions,
    backoff: BackoffStrategy,
}

impl RequestCoordinatorBuilder {
    /// Shared cache of `DEFAULT_SHARED_CACHE_SIZE` entries, tokio clock,
    /// default request options and backoff schedule
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            cache_config: CacheConfig::with_max_size(DEFAULT_SHARED_CACHE_SIZE),
            clock: Arc::new(TokioClock),
            monitor: Arc::new(PerformanceMonitor::new()),
            defaults: RequestOptions::default(),
            backoff: BackoffStrategy::request_schedule(),
        }
    }

    /// Capacity, TTL and eviction of the response cache
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Clock for cache expiry and latency measurement
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Share an existing monitor
    pub fn monitor(mut self, monitor: Arc<PerformanceMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    /// Options used by the convenience verbs
    pub fn default_options(mut self, options: RequestOptions) -> Self {
        self.defaults = options;
        self
    }

    /// Delays between attempts
    pub fn backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Assemble the coordinator
    pub fn build(self) -> RequestCoordinator {
        let cache = Cache::with_clock(self.cache_config, Arc::clone(&self.clock));
        RequestCoordinator {
            inner: Arc::new(Inner {
                transport: self.transport,
                cache,
                pending: PendingRegistry::new(),
                monitor: self.monitor,
                clock: self.clock,
                defaults: self.defaults,
                backoff: self.backoff,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;

    /// Echoes the URL back and counts calls
    #[derive(Default)]
    struct EchoTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for EchoTransport {
        async fn send(&self, request: &RequestDescriptor) -> Result<Value, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({"url": request.url, "method": request.method}))
        }
    }

    fn coordinator() -> (RequestCoordinator, Arc<EchoTransport>) {
        let transport = Arc::new(EchoTransport::default());
        (RequestCoordinator::new(transport.clone()), transport)
    }

    /// Validates a repeated GET is served from cache.
    ///
    /// Assertions:
    /// - Confirms the transport ran once.
    /// - Confirms the monitor saw one hit and one miss.
    #[tokio::test(start_paused = true)]
    async fn test_get_is_cached() {
        let (coordinator, transport) = coordinator();

        let first = coordinator.get("/items").await;
        let second = coordinator.get("/items").await;

        assert_eq!(first, second);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

        let metrics = coordinator.metrics();
        assert_eq!(metrics.api_calls, 2);
        assert_eq!(metrics.cache_hits, 1);
        assert_eq!(metrics.cache_misses, 1);
    }

    /// Validates that POST bypasses the cache.
    #[tokio::test(start_paused = true)]
    async fn test_post_is_not_cached() {
        let (coordinator, transport) = coordinator();

        coordinator.post("/items", json!({"n": 1})).await.expect("post");
        coordinator.post("/items", json!({"n": 1})).await.expect("post");

        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
        assert_eq!(coordinator.cache_stats().size, 0);
    }

    /// Validates `cache: Some(false)` on a GET skips reads and writes.
    #[tokio::test(start_paused = true)]
    async fn test_get_with_cache_disabled() {
        let (coordinator, transport) = coordinator();
        let options = RequestOptions::default().no_cache();

        for _ in 0..2 {
            coordinator
                .request_value(RequestDescriptor::get("/live"), options.clone())
                .await
                .expect("get");
        }

        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
        assert_eq!(coordinator.metrics().cache_hits, 0);
    }

    /// Validates typed decoding and the decode error path.
    #[tokio::test(start_paused = true)]
    async fn test_typed_request() {
        #[derive(Debug, serde::Deserialize)]
        struct Echo {
            url: String,
        }

        let (coordinator, _) = coordinator();

        let echo: Echo = coordinator
            .request(RequestDescriptor::get("/typed"), RequestOptions::default())
            .await
            .expect("typed");
        assert_eq!(echo.url, "/typed");

        let err = coordinator
            .request::<Vec<u32>>(RequestDescriptor::get("/typed"), RequestOptions::default())
            .await
            .expect_err("shape mismatch");
        assert_eq!(err.kind, optiq_domain::ErrorKind::Decode);
    }

    /// Validates `invalidate_cache` with and without a pattern.
    #[tokio::test(start_paused = true)]
    async fn test_invalidate_cache() {
        let (coordinator, _) = coordinator();
        for url in ["/quizzes/1", "/quizzes/2", "/users/1"] {
            coordinator.get(url).await.expect("get");
        }

        assert_eq!(coordinator.invalidate_cache(Some("/quizzes/")), 2);
        assert_eq!(coordinator.cache_stats().keys, vec!["GET:/users/1:".to_string()]);

        assert_eq!(coordinator.invalidate_cache(None), 1);
        assert_eq!(coordinator.cache_stats().size, 0);
    }

    #[test]
    fn test_default_cache_is_shared_size() {
        let (coordinator, _) = coordinator();

        let stats = coordinator.cache_stats();
        assert_eq!(stats.max_size, DEFAULT_SHARED_CACHE_SIZE);
        assert_eq!(stats.max_size, 200);
        assert_eq!(stats.size, 0);
    }
}
