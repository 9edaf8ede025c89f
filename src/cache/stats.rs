//! Cache Statistics Module
//!
//! Tracks cache performance counters across both tiers.

use serde::Serialize;

// == Cache Stats ==
/// Counters for cache effectiveness, split by serving tier.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Retrievals served from the memory tier
    pub memory_hits: u64,
    /// Retrievals served from the disk tier
    pub disk_hits: u64,
    /// Retrievals that found nothing valid in either tier
    pub misses: u64,
    /// Entries evicted from the memory tier by LRU policy
    pub evictions: u64,
    /// Disk entries copied into the memory tier on access
    pub promotions: u64,
    /// Entries dropped lazily because their TTL had lapsed
    pub expirations: u64,
    /// Current number of memory-tier entries
    pub memory_entries: usize,
    /// Current aggregate memory-tier payload bytes
    pub memory_bytes: usize,
}

impl CacheStats {
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Fraction of gets served from either tier; 0.0 with no traffic.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.memory_hits + self.disk_hits;
        let total = hits + self.misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    pub fn record_memory_hit(&mut self) {
        self.memory_hits += 1;
    }

    pub fn record_disk_hit(&mut self) {
        self.disk_hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_promotion(&mut self) {
        self.promotions += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }
}
