//! API Module
//!
//! HTTP handlers and routing for the feed cache REST API.
//!
//! # Endpoints
//! - `GET /indicators` - Resolve all registered feeds as one batch
//! - `GET /indicators/:name` - Resolve one feed
//! - `DELETE /cache/:name` - Invalidate cached entries for a feed
//! - `DELETE /cache` - Clear both cache tiers
//! - `GET /stats` - Cache and fetch statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
