//! API Integration Tests
//!
//! Drives the full Axum router through tower's oneshot, asserting on the
//! JSON bodies each endpoint returns.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower::ServiceExt;

use feedcache::api::create_router;
use feedcache::{
    AppState, CacheStore, FeedError, FeedParams, FeedRegistry, FeedSpec, Orchestrator,
    PerformanceMonitor,
};

// == Helper Functions ==

/// Router over a fresh cache with one healthy feed and one broken feed.
fn test_app(dir: &std::path::Path) -> Router {
    let store = CacheStore::new(16, usize::MAX, dir, Duration::from_secs(300)).unwrap();
    let orchestrator = Orchestrator::new(
        Arc::new(RwLock::new(store)),
        Arc::new(PerformanceMonitor::default()),
    );

    let mut registry = FeedRegistry::new();
    registry.register(FeedSpec {
        name: "claims".to_string(),
        ttl: Duration::from_secs(300),
        timeout: Duration::from_secs(5),
        default_params: FeedParams::new(),
        origin: Arc::new(|_| Box::pin(async { Ok(json!([220_000, 218_500, 221_000])) })),
    });
    registry.register(FeedSpec {
        name: "pmi".to_string(),
        ttl: Duration::from_secs(300),
        timeout: Duration::from_secs(5),
        default_params: FeedParams::new(),
        origin: Arc::new(|_| {
            Box::pin(async { Err(FeedError::Origin("scrape blocked".to_string())) })
        }),
    });

    create_router(AppState::new(orchestrator, registry))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

// == Health ==

#[tokio::test]
async fn test_health_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

// == Indicators ==

#[tokio::test]
async fn test_get_all_indicators_isolates_failures() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let (status, body) = get(&app, "/indicators").await;
    assert_eq!(status, StatusCode::OK);

    let indicators = body["indicators"].as_object().unwrap();
    assert_eq!(indicators.len(), 2);
    assert_eq!(indicators["claims"]["outcome"], "fresh");
    assert_eq!(indicators["pmi"]["outcome"], "failed");
    assert!(indicators["pmi"]["reason"]
        .as_str()
        .unwrap()
        .contains("scrape blocked"));
    assert_eq!(body["failures"], 1);
}

#[tokio::test]
async fn test_get_single_indicator_fresh_then_hit() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let (status, first) = get(&app, "/indicators/claims").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["name"], "claims");
    assert_eq!(first["outcome"], "fresh");
    assert_eq!(first["entry"]["payload"], json!([220_000, 218_500, 221_000]));

    let (status, second) = get(&app, "/indicators/claims").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["outcome"], "cache_hit");
    assert_eq!(second["tier"], "memory");
}

#[tokio::test]
async fn test_query_params_shape_the_cache_key() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let (_, first) = get(&app, "/indicators/claims?periods=52").await;
    assert_eq!(first["outcome"], "fresh");

    // Different parameters miss; identical parameters hit
    let (_, other) = get(&app, "/indicators/claims?periods=104").await;
    assert_eq!(other["outcome"], "fresh");
    let (_, again) = get(&app, "/indicators/claims?periods=52").await;
    assert_eq!(again["outcome"], "cache_hit");
}

#[tokio::test]
async fn test_unknown_indicator_returns_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let (status, body) = get(&app, "/indicators/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn test_failed_feed_is_reported_in_outcome_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    // Per-feed fetches surface the failure in the body but keep HTTP 200;
    // the outcome envelope carries the error
    let (status, body) = get(&app, "/indicators/pmi").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "failed");
}

// == Invalidation ==

#[tokio::test]
async fn test_invalidate_feed_then_refetch() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let _ = get(&app, "/indicators/claims").await;

    let (status, body) = delete(&app, "/cache/claims").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["feed"], "claims");
    assert!(body["removed"].as_u64().unwrap() >= 1);

    // Idempotent: nothing left to remove
    let (_, again) = delete(&app, "/cache/claims").await;
    assert_eq!(again["removed"], 0);

    let (_, refetched) = get(&app, "/indicators/claims").await;
    assert_eq!(refetched["outcome"], "fresh");
}

#[tokio::test]
async fn test_clear_cache() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let _ = get(&app, "/indicators/claims").await;
    let (status, body) = delete(&app, "/cache").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "cache cleared");

    let (_, refetched) = get(&app, "/indicators/claims").await;
    assert_eq!(refetched["outcome"], "fresh");
}

// == Stats ==

#[tokio::test]
async fn test_stats_reflect_traffic() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let _ = get(&app, "/indicators/claims").await;
    let _ = get(&app, "/indicators/claims").await;

    let (status, body) = get(&app, "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cache"]["misses"], 1);
    assert_eq!(body["cache"]["memory_hits"], 1);
    assert_eq!(body["cache"]["memory_entries"], 1);
    assert!(body["hit_rate"].as_f64().unwrap() > 0.0);
    assert!(body["operations"]["fetch.claims"]["count"].as_u64().unwrap() >= 1);
}
