//! feedcache - Multi-tier indicator feed cache
//!
//! Serves a fixed set of named data feeds through a two-tier cache (memory
//! LRU + durable disk) populated by a concurrent fetch orchestrator with
//! single-flight deduplication and per-task failure isolation.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod feeds;
pub mod models;
pub mod monitor;
pub mod orchestrator;
pub mod registry;
pub mod singleflight;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheEntry, CacheKey, CacheStore, CacheTier, FeedParams};
pub use config::Config;
pub use error::FeedError;
pub use monitor::PerformanceMonitor;
pub use orchestrator::{BatchResult, FetchOutcome, FetchTask, Orchestrator, OriginFn};
pub use registry::{FeedRegistry, FeedSpec};
pub use tasks::spawn_prune_task;
