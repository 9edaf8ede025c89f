//! Error types for the feed cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Feed Error Enum ==
/// Unified error type for the feed cache.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The origin fetch function itself failed (network, parsing, upstream error)
    #[error("Origin fetch failed: {0}")]
    Origin(String),

    /// Durable tier unavailable; always recovered inside the cache store
    #[error("Cache I/O error: {0}")]
    CacheIo(#[from] std::io::Error),

    /// Malformed task descriptor, rejected before scheduling
    #[error("Invalid task: {0}")]
    InvalidKey(String),

    /// Requested feed is not registered
    #[error("Unknown feed: {0}")]
    UnknownFeed(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            FeedError::Origin(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            FeedError::CacheIo(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            FeedError::InvalidKey(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            FeedError::UnknownFeed(name) => {
                (StatusCode::NOT_FOUND, format!("unknown feed: {}", name))
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the feed cache.
pub type Result<T> = std::result::Result<T, FeedError>;
