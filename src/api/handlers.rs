//! API Handlers
//!
//! HTTP request handlers for each feed cache endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::cache::{CacheKey, FeedParams};
use crate::error::Result;
use crate::models::{
    BatchResponse, ClearResponse, HealthResponse, IndicatorResponse, InvalidateResponse,
    StatsResponse,
};
use crate::orchestrator::Orchestrator;
use crate::registry::FeedRegistry;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Batch resolver owning the cache store and monitor handles
    pub orchestrator: Arc<Orchestrator>,
    /// The fixed set of feeds this process serves
    pub registry: Arc<FeedRegistry>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, registry: FeedRegistry) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            registry: Arc::new(registry),
        }
    }
}

/// Handler for GET /indicators
///
/// Resolves every registered feed as one batch. Individual failures are
/// reported per feed; the batch itself always succeeds.
pub async fn get_all_indicators(State(state): State<AppState>) -> Json<BatchResponse> {
    let tasks = state.registry.tasks_for_all();
    let results = state.orchestrator.resolve_batch(tasks).await;
    Json(BatchResponse::new(results))
}

/// Handler for GET /indicators/:name
///
/// Resolves one feed; query parameters become part of the cache key.
pub async fn get_indicator(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<FeedParams>,
) -> Result<Json<IndicatorResponse>> {
    let task = state.registry.task(&name, params)?;
    let outcome = state.orchestrator.resolve(task).await;
    Ok(Json(IndicatorResponse::new(name, outcome)))
}

/// Handler for DELETE /cache/:name
///
/// Invalidates cached entries for a feed: with query parameters, only the
/// matching key; without, every entry for the feed. Idempotent.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<FeedParams>,
) -> Result<Json<InvalidateResponse>> {
    let cache = state.orchestrator.cache();
    let removed = if params.is_empty() {
        cache.write().await.invalidate_feed(&name)
    } else {
        let key = CacheKey::new(&name, &params)?;
        usize::from(cache.write().await.invalidate(&key))
    };

    Ok(Json(InvalidateResponse {
        feed: name,
        removed,
    }))
}

/// Handler for DELETE /cache
///
/// Clears both cache tiers.
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.orchestrator.cache().write().await.clear_all();
    Json(ClearResponse::cleared())
}

/// Handler for GET /stats
///
/// Returns cache counters plus performance-monitor aggregates.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.orchestrator.cache();
    let guard = cache.read().await;
    let stats = guard.stats();
    let disk_files = guard.disk_file_count();
    drop(guard);

    let operations = state.orchestrator.monitor().all_stats();
    Json(StatsResponse::new(stats, disk_files, operations))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
