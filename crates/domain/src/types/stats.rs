//! Statistics types
//!
//! Snapshots handed to callers that want to display or export how the
//! request layer is performing.

use serde::{Deserialize, Serialize};

/* -------------------------------------------------------------------------- */
/* Performance Metrics */
/* -------------------------------------------------------------------------- */

/// Aggregated request metrics
///
/// Latency figures cover only calls that were not served from cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Every recorded call, cache hits included
    pub api_calls: u64,

    /// Calls answered from the response cache
    pub cache_hits: u64,

    /// Calls that went to the network (or waited on a call that did)
    pub cache_misses: u64,

    /// Calls that ended in an error
    pub error_count: u64,

    /// Mean response time of non-cache calls, 0 with no samples
    pub average_response_time_ms: f64,

    /// `error_count / api_calls`, 0 with no calls
    pub error_rate: f64,

    /// `cache_hits / (cache_hits + cache_misses)`, 0 with no calls
    pub cache_hit_rate: f64,

    /// Median over the most recent non-cache samples
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p50_response_time_ms: Option<f64>,

    /// 95th percentile over the most recent non-cache samples
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p95_response_time_ms: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates that empty percentiles are omitted from JSON.
    #[test]
    fn test_metrics_serialization_omits_empty_percentiles() {
        let json = serde_json::to_value(PerformanceMetrics::default()).expect("serialize");
        assert_eq!(json["api_calls"], 0);
        assert!(json.get("p50_response_time_ms").is_none());
    }
}
