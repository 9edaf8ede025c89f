//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Tier ==
/// Which backing store an entry was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheTier {
    /// In-memory tier (fast, bounded)
    Memory,
    /// On-disk tier (slower, persists across restarts)
    Disk,
}

// == Cache Entry ==
/// A single cached payload with expiry metadata.
///
/// Mutated only by the cache store, on write or on access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Canonical cache key this entry was stored under
    pub key: String,
    /// The cached payload, opaque to the cache
    pub payload: Value,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds); always strictly after created_at
    pub expires_at: u64,
    /// Last access timestamp (Unix milliseconds)
    pub last_accessed_at: u64,
    /// Approximate payload size in bytes (serialized length)
    pub size_estimate: usize,
    /// Tier the entry was served from
    pub tier: CacheTier,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new memory-tier entry expiring `ttl` from now.
    ///
    /// A zero TTL is clamped to one millisecond so that `expires_at`
    /// stays strictly after `created_at`.
    pub fn new(key: String, payload: Value, ttl: Duration) -> Self {
        let now = current_timestamp_ms();
        let ttl_ms = (ttl.as_millis() as u64).max(1);
        let size_estimate = serde_json::to_vec(&payload).map(|v| v.len()).unwrap_or(0);

        Self {
            key,
            payload,
            created_at: now,
            expires_at: now + ttl_ms,
            last_accessed_at: now,
            size_estimate,
            tier: CacheTier::Memory,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to `expires_at`, so it becomes invisible to
    /// readers the instant its TTL lapses.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }

    // == Touch ==
    /// Records an access, updating `last_accessed_at`.
    pub fn touch(&mut self) {
        self.last_accessed_at = current_timestamp_ms();
    }

    // == Time To Live ==
    /// Remaining TTL in milliseconds; zero once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.expires_at.saturating_sub(current_timestamp_ms())
    }

    /// Returns a copy tagged as served from the given tier.
    pub fn served_from(&self, tier: CacheTier) -> Self {
        let mut entry = self.clone();
        entry.tier = tier;
        entry
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
