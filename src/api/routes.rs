//! API Routes
//!
//! Configures the Axum router with all feed cache endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_cache_handler, get_all_indicators, get_indicator, health_handler, invalidate_handler,
    stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /indicators` - Resolve all registered feeds as one batch
/// - `GET /indicators/:name` - Resolve one feed (query params key the cache)
/// - `DELETE /cache/:name` - Invalidate cached entries for a feed
/// - `DELETE /cache` - Clear both cache tiers
/// - `GET /stats` - Cache and fetch statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/indicators", get(get_all_indicators))
        .route("/indicators/:name", get(get_indicator))
        .route("/cache/:name", delete(invalidate_handler))
        .route("/cache", delete(clear_cache_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
