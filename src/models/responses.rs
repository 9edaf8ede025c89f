//! Response DTOs for the feed cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::CacheStats;
use crate::monitor::OperationStats;
use crate::orchestrator::FetchOutcome;

/// Response body for a single indicator (GET /indicators/:name)
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorResponse {
    /// The requested feed name
    pub name: String,
    /// The resolution outcome, tagged `cache_hit` / `fresh` / `failed` / `timed_out`
    #[serde(flatten)]
    pub result: FetchOutcome,
}

impl IndicatorResponse {
    pub fn new(name: impl Into<String>, result: FetchOutcome) -> Self {
        Self {
            name: name.into(),
            result,
        }
    }
}

/// Response body for a full batch (GET /indicators)
#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    /// One outcome per registered feed
    pub indicators: BTreeMap<String, FetchOutcome>,
    /// Number of feeds that failed or timed out
    pub failures: usize,
    /// When the batch completed, ISO 8601
    pub fetched_at: String,
}

impl BatchResponse {
    /// Wraps a batch result, counting failed and timed-out feeds.
    pub fn new(results: impl IntoIterator<Item = (String, FetchOutcome)>) -> Self {
        let indicators: BTreeMap<String, FetchOutcome> = results.into_iter().collect();
        let failures = indicators
            .values()
            .filter(|o| matches!(o, FetchOutcome::Failed { .. } | FetchOutcome::TimedOut))
            .count();
        Self {
            indicators,
            failures,
            fetched_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for cache invalidation (DELETE /cache/:name)
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// The feed whose entries were removed
    pub feed: String,
    /// Number of tier entries removed across memory and disk
    pub removed: usize,
}

/// Response body for a full cache clear (DELETE /cache)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
}

impl ClearResponse {
    pub fn cleared() -> Self {
        Self {
            message: "cache cleared".to_string(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Cache counters and occupancy
    pub cache: CacheStats,
    /// Overall cache hit rate
    pub hit_rate: f64,
    /// Files currently held by the disk tier
    pub disk_files: usize,
    /// Aggregated fetch statistics per operation
    pub operations: BTreeMap<String, OperationStats>,
}

impl StatsResponse {
    pub fn new(
        cache: CacheStats,
        disk_files: usize,
        operations: BTreeMap<String, OperationStats>,
    ) -> Self {
        let hit_rate = cache.hit_rate();
        Self {
            cache,
            hit_rate,
            disk_files,
            operations,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}
