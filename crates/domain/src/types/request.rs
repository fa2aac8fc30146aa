//! Request descriptors and per-request options

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use optiq_common::duration_millis;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{DEFAULT_CACHE_TTL_MS, DEFAULT_RETRY_COUNT, DEFAULT_TIMEOUT_MS};

/// HTTP verbs accepted by the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical network call
///
/// Headers take part in the request but not in its identity: two
/// descriptors that differ only in headers share a cache entry and a
/// pending execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), headers: BTreeMap::new(), body: None }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, url).with_body(body)
    }

    pub fn put(url: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, url).with_body(body)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Identity used for both the response cache and request coalescing
    ///
    /// Format: `"{METHOD}:{url}:{body}"`, where the body is compact JSON and
    /// empty when absent.
    ///
    /// # Example
    /// ```
    /// use optiq_domain::RequestDescriptor;
    /// use serde_json::json;
    ///
    /// assert_eq!(RequestDescriptor::get("/api/users").cache_key(), "GET:/api/users:");
    /// assert_eq!(
    ///     RequestDescriptor::post("/api/users", json!({"name": "ada"})).cache_key(),
    ///     r#"POST:/api/users:{"name":"ada"}"#
    /// );
    /// ```
    pub fn cache_key(&self) -> String {
        let body = self.body.as_ref().map(Value::to_string).unwrap_or_default();
        format!("{}:{}:{}", self.method, self.url, body)
    }
}

/// Per-request knobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestOptions {
    /// Use the response cache; `None` means "yes for GET"
    pub cache: Option<bool>,

    /// Lifetime of a cached response
    #[serde(rename = "cache_ttl_ms", with = "duration_millis")]
    pub cache_ttl: Duration,

    /// Retries after the first attempt
    pub retry: u32,

    /// Limit for each attempt
    #[serde(rename = "timeout_ms", with = "duration_millis")]
    pub timeout: Duration,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            cache: None,
            cache_ttl: Duration::from_millis(DEFAULT_CACHE_TTL_MS),
            retry: DEFAULT_RETRY_COUNT,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl RequestOptions {
    /// Whether a request with `method` reads and writes the cache
    ///
    /// Only GET is ever cached; `cache` can switch that off per request.
    pub fn caches(&self, method: Method) -> bool {
        method == Method::Get && self.cache.unwrap_or(true)
    }

    pub fn no_cache(mut self) -> Self {
        self.cache = Some(false);
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    /// Validates `RequestDescriptor::cache_key` for the key format scenario.
    ///
    /// Assertions:
    /// - Confirms the method is upper-case and an absent body leaves a
    ///   trailing colon.
    /// - Confirms headers do not affect the key.
    #[test]
    fn test_cache_key_format() {
        let plain = RequestDescriptor::get("https://api.example.com/items?page=2");
        assert_eq!(plain.cache_key(), "GET:https://api.example.com/items?page=2:");

        let with_header = plain.clone().with_header("Authorization", "Bearer t");
        assert_eq!(with_header.cache_key(), plain.cache_key());

        let put = RequestDescriptor::put("/a", json!([1, 2]));
        assert_eq!(put.cache_key(), "PUT:/a:[1,2]");
    }

    /// Validates that the same body always yields the same key.
    #[test]
    fn test_cache_key_is_deterministic() {
        let a = RequestDescriptor::post("/q", json!({"b": 2, "a": 1}));
        let b = RequestDescriptor::post("/q", json!({"b": 2, "a": 1}));
        assert_eq!(a.cache_key(), b.cache_key());
        assert_ne!(a.cache_key(), RequestDescriptor::get("/q").cache_key());
    }

    /// Validates `RequestOptions::default` values.
    #[test]
    fn test_request_options_default() {
        let options = RequestOptions::default();
        assert_eq!(options.cache, None);
        assert_eq!(options.cache_ttl, Duration::from_secs(300));
        assert_eq!(options.retry, 2);
        assert_eq!(options.timeout, Duration::from_secs(10));
    }

    /// Validates `RequestOptions::caches` for every method.
    #[test]
    fn test_caches_only_get() {
        let options = RequestOptions::default();
        assert!(options.caches(Method::Get));
        assert!(!options.caches(Method::Post));
        assert!(!options.caches(Method::Put));
        assert!(!options.caches(Method::Delete));

        assert!(!options.clone().no_cache().caches(Method::Get));

        let forced = RequestOptions { cache: Some(true), ..RequestOptions::default() };
        assert!(!forced.caches(Method::Post));
    }

    /// Validates partial deserialization of options.
    #[test]
    fn test_request_options_serde_defaults() {
        let options: RequestOptions =
            serde_json::from_value(json!({"retry": 0, "timeout_ms": 500})).expect("deserialize");
        assert_eq!(options.retry, 0);
        assert_eq!(options.timeout, Duration::from_millis(500));
        assert_eq!(options.cache_ttl, Duration::from_secs(300));
    }

    /// Validates the upper-case serde form of `Method`.
    #[test]
    fn test_method_serde() {
        assert_eq!(serde_json::to_value(Method::Delete).expect("serialize"), json!("DELETE"));
        let method: Method = serde_json::from_value(json!("POST")).expect("deserialize");
        assert_eq!(method, Method::Post);
    }
}
