//! Cache Store Module
//!
//! Two-tier façade: memory first, disk behind it, with promotion on disk
//! hits and lazy expiry in both tiers.

use std::io;
use std::path::Path;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::cache::memory::MemoryLookup;
use crate::cache::{CacheEntry, CacheKey, CacheStats, CacheTier, DiskTier, MemoryTier};

// == Cache Store ==
/// Multi-tier cache combining the bounded memory tier with the durable
/// disk tier.
///
/// An owned instance, wired at startup; all mutation goes through it.
#[derive(Debug)]
pub struct CacheStore {
    memory: MemoryTier,
    disk: DiskTier,
    stats: CacheStats,
    default_ttl: Duration,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store with the given memory bounds and disk directory.
    ///
    /// Fails only if the disk directory cannot be created; after that the
    /// disk tier never raises.
    pub fn new(
        max_entries: usize,
        max_bytes: usize,
        disk_dir: impl AsRef<Path>,
        default_ttl: Duration,
    ) -> io::Result<Self> {
        Ok(Self {
            memory: MemoryTier::new(max_entries, max_bytes),
            disk: DiskTier::new(disk_dir.as_ref().to_path_buf())?,
            stats: CacheStats::new(),
            default_ttl,
        })
    }

    // == Get ==
    /// Retrieves a valid entry, checking memory first and then disk.
    ///
    /// A valid disk entry is promoted into the memory tier before being
    /// returned; the returned copy is tagged with the tier that served it.
    /// Expired entries in either tier are removed and treated as a miss.
    pub fn get(&mut self, key: &CacheKey) -> Option<CacheEntry> {
        match self.memory.get(key.as_str()) {
            MemoryLookup::Hit(entry) => {
                self.stats.record_memory_hit();
                return Some(entry);
            }
            MemoryLookup::Expired => {
                self.stats.record_expiration();
                // Any disk copy carries the same expiry, but removing it is
                // the disk tier's job on its own read path.
            }
            MemoryLookup::Miss => {}
        }

        match self.disk.get(key) {
            Some(mut entry) => {
                entry.touch();
                self.stats.record_disk_hit();
                self.stats.record_promotion();
                debug!("Promoting {} from disk to memory", key);

                let evicted = self.memory.insert(entry.clone());
                for _ in &evicted {
                    self.stats.record_eviction();
                }
                Some(entry.served_from(CacheTier::Disk))
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Put ==
    /// Stores a payload under the key in both tiers.
    ///
    /// Uses the store's default TTL when none is given. The memory write
    /// may evict least-recently-accessed entries; the disk write is
    /// best-effort. Returns the stored entry.
    pub fn put(&mut self, key: &CacheKey, payload: Value, ttl: Option<Duration>) -> CacheEntry {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let entry = CacheEntry::new(key.as_str().to_string(), payload, ttl);

        let evicted = self.memory.insert(entry.clone());
        for victim in &evicted {
            debug!("Evicted {} from memory tier", victim);
            self.stats.record_eviction();
        }

        self.disk.put(key, &entry);
        entry
    }

    // == Invalidate ==
    /// Removes one key from both tiers. Idempotent; true if either tier
    /// held it.
    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        let in_memory = self.memory.remove(key.as_str());
        let on_disk = self.disk.remove(key);
        in_memory || on_disk
    }

    // == Invalidate Feed ==
    /// Removes every entry for the named feed from both tiers. Returns the
    /// total number of tier entries removed.
    pub fn invalidate_feed(&mut self, feed: &str) -> usize {
        self.memory.remove_feed(feed) + self.disk.remove_feed(feed)
    }

    // == Clear All ==
    /// Empties both tiers.
    pub fn clear_all(&mut self) {
        self.memory.clear();
        self.disk.clear();
    }

    // == Prune Disk ==
    /// Removes expired entries from the disk tier. Returns the number
    /// removed; called periodically by the background task.
    pub fn prune_disk(&mut self) -> usize {
        self.disk.prune_expired()
    }

    // == Stats ==
    /// Snapshot of counters plus current occupancy.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.memory_entries = self.memory.len();
        stats.memory_bytes = self.memory.bytes();
        stats
    }

    /// Number of files currently held by the disk tier.
    pub fn disk_file_count(&self) -> usize {
        self.disk.file_count()
    }

    /// Directory backing the disk tier.
    pub fn disk_dir(&self) -> &Path {
        self.disk.root()
    }

    /// Default TTL applied when a put carries none.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}
