//! Memory Tier Module
//!
//! HashMap storage with LRU tracking, bounded by entry count and byte budget.

use std::collections::HashMap;

use crate::cache::{CacheEntry, LruTracker};

/// Outcome of a memory-tier lookup.
#[derive(Debug)]
pub enum MemoryLookup {
    /// Valid entry found and touched
    Hit(CacheEntry),
    /// Entry was present but its TTL had lapsed; it has been removed
    Expired,
    /// No entry for the key
    Miss,
}

// == Memory Tier ==
/// In-memory tier: always-available fast path.
///
/// Capacity is enforced on insert: while the tier is over its entry-count
/// or byte budget, the least-recently-accessed entry is evicted. A single
/// entry larger than the whole byte budget is tolerated rather than
/// evicting what was just written.
#[derive(Debug)]
pub struct MemoryTier {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
    max_entries: usize,
    max_bytes: usize,
    current_bytes: usize,
}

impl MemoryTier {
    // == Constructor ==
    pub fn new(max_entries: usize, max_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            max_entries,
            max_bytes,
            current_bytes: 0,
        }
    }

    // == Get ==
    /// Looks up a key, applying lazy expiry and updating recency on a hit.
    pub fn get(&mut self, key: &str) -> MemoryLookup {
        match self.entries.get_mut(key) {
            Some(entry) if entry.is_expired() => {
                let removed = self.entries.remove(key);
                if let Some(entry) = removed {
                    self.current_bytes = self.current_bytes.saturating_sub(entry.size_estimate);
                }
                self.lru.forget(key);
                MemoryLookup::Expired
            }
            Some(entry) => {
                entry.touch();
                let snapshot = entry.clone();
                self.lru.touch(key);
                MemoryLookup::Hit(snapshot)
            }
            None => MemoryLookup::Miss,
        }
    }

    // == Insert ==
    /// Stores an entry, evicting least-recently-accessed entries while the
    /// tier is over capacity. Returns the keys evicted to make room.
    pub fn insert(&mut self, entry: CacheEntry) -> Vec<String> {
        let key = entry.key.clone();

        if let Some(previous) = self.entries.remove(&key) {
            self.current_bytes = self.current_bytes.saturating_sub(previous.size_estimate);
        }
        self.current_bytes += entry.size_estimate;
        self.entries.insert(key.clone(), entry);
        self.lru.touch(&key);

        let mut evicted = Vec::new();
        while self.over_capacity() && self.entries.len() > 1 {
            match self.lru.pop_lru() {
                Some(victim) => {
                    if let Some(old) = self.entries.remove(&victim) {
                        self.current_bytes =
                            self.current_bytes.saturating_sub(old.size_estimate);
                    }
                    evicted.push(victim);
                }
                None => break,
            }
        }
        evicted
    }

    fn over_capacity(&self) -> bool {
        self.entries.len() > self.max_entries || self.current_bytes > self.max_bytes
    }

    // == Remove ==
    /// Removes an entry by key. Idempotent.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.current_bytes = self.current_bytes.saturating_sub(entry.size_estimate);
                self.lru.forget(key);
                true
            }
            None => false,
        }
    }

    // == Remove Feed ==
    /// Removes every entry whose key belongs to the given feed.
    pub fn remove_feed(&mut self, feed: &str) -> usize {
        let prefix = format!("{}|", feed);
        let victims: Vec<String> = self
            .entries
            .keys()
            .filter(|k| *k == feed || k.starts_with(&prefix))
            .cloned()
            .collect();

        for key in &victims {
            self.remove(key);
        }
        victims.len()
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current_bytes = 0;
        while self.lru.pop_lru().is_some() {}
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the tier holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Aggregate size_estimate of all resident entries.
    pub fn bytes(&self) -> usize {
        self.current_bytes
    }

    /// Whether a key is currently resident (ignores expiry).
    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn entry(key: &str) -> CacheEntry {
        CacheEntry::new(key.to_string(), json!({"k": key}), Duration::from_secs(300))
    }

    #[test]
    fn test_insert_and_get() {
        let mut tier = MemoryTier::new(10, usize::MAX);
        tier.insert(entry("a"));

        assert!(matches!(tier.get("a"), MemoryLookup::Hit(_)));
        assert!(matches!(tier.get("b"), MemoryLookup::Miss));
    }

    #[test]
    fn test_entry_count_eviction() {
        let mut tier = MemoryTier::new(2, usize::MAX);
        tier.insert(entry("a"));
        tier.insert(entry("b"));
        let evicted = tier.insert(entry("c"));

        assert_eq!(evicted, vec!["a".to_string()]);
        assert_eq!(tier.len(), 2);
        assert!(!tier.contains("a"));
        assert!(tier.contains("b"));
        assert!(tier.contains("c"));
    }

    #[test]
    fn test_get_refreshes_recency() {
        let mut tier = MemoryTier::new(2, usize::MAX);
        tier.insert(entry("a"));
        tier.insert(entry("b"));

        // Touch a so b becomes the eviction candidate
        let _ = tier.get("a");
        let evicted = tier.insert(entry("c"));

        assert_eq!(evicted, vec!["b".to_string()]);
        assert!(tier.contains("a"));
        assert!(tier.contains("c"));
    }

    #[test]
    fn test_byte_budget_eviction() {
        let size = entry("a").size_estimate;
        // Room for roughly two entries by bytes, many by count
        let mut tier = MemoryTier::new(100, size * 2);
        tier.insert(entry("a"));
        tier.insert(entry("b"));
        let evicted = tier.insert(entry("c"));

        assert!(!evicted.is_empty());
        assert!(tier.bytes() <= size * 2);
    }

    #[test]
    fn test_single_oversized_entry_is_kept() {
        let mut tier = MemoryTier::new(10, 1);
        let evicted = tier.insert(entry("huge"));

        assert!(evicted.is_empty());
        assert_eq!(tier.len(), 1);
    }

    #[test]
    fn test_overwrite_adjusts_bytes() {
        let mut tier = MemoryTier::new(10, usize::MAX);
        tier.insert(entry("a"));
        let before = tier.bytes();
        tier.insert(entry("a"));

        assert_eq!(tier.len(), 1);
        assert_eq!(tier.bytes(), before);
    }

    #[test]
    fn test_expired_entry_lookup() {
        let mut tier = MemoryTier::new(10, usize::MAX);
        let mut e = entry("a");
        e.expires_at = e.created_at; // force expiry in the past
        tier.insert(e);

        assert!(matches!(tier.get("a"), MemoryLookup::Expired));
        // Removed by the lookup
        assert!(matches!(tier.get("a"), MemoryLookup::Miss));
        assert_eq!(tier.bytes(), 0);
    }

    #[test]
    fn test_remove_feed_matches_bare_and_parameterized() {
        let mut tier = MemoryTier::new(10, usize::MAX);
        tier.insert(entry("pce"));
        tier.insert(entry("pce|periods:24"));
        tier.insert(entry("pce_extra")); // different feed, shares a prefix
        tier.insert(entry("claims"));

        let removed = tier.remove_feed("pce");
        assert_eq!(removed, 2);
        assert!(tier.contains("pce_extra"));
        assert!(tier.contains("claims"));
    }

    #[test]
    fn test_clear() {
        let mut tier = MemoryTier::new(10, usize::MAX);
        tier.insert(entry("a"));
        tier.insert(entry("b"));
        tier.clear();

        assert!(tier.is_empty());
        assert_eq!(tier.bytes(), 0);
    }
}
