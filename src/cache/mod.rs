//! Cache Module
//!
//! Two-tier caching: a bounded in-memory tier with LRU eviction and a
//! durable on-disk tier, both with TTL expiry.

mod disk;
mod entry;
pub mod key;
mod lru;
mod memory;
mod stats;
mod store;


// Re-export public types
pub use disk::DiskTier;
pub use entry::{current_timestamp_ms, CacheEntry, CacheTier};
pub use key::{CacheKey, FeedParams};
pub use lru::LruTracker;
pub use memory::MemoryTier;
pub use stats::CacheStats;
pub use store::CacheStore;
