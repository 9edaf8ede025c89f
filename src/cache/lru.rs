//! LRU Tracker Module
//!
//! Tracks access recency for memory-tier eviction.

use std::collections::VecDeque;

// == LRU Tracker ==
/// Tracks access order for LRU eviction.
///
/// Keys are stored in a VecDeque where:
/// - Front = Least recently used (next eviction candidate)
/// - Back = Most recently used
#[derive(Debug, Default)]
pub struct LruTracker {
    order: VecDeque<String>,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Touch ==
    /// Marks a key as most recently used.
    pub fn touch(&mut self, key: &str) {
        self.forget(key);
        self.order.push_back(key.to_string());
    }

    // == Forget ==
    /// Removes a key from the tracker, if present.
    pub fn forget(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    // == Pop LRU ==
    /// Removes and returns the least recently used key.
    pub fn pop_lru(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    // == Peek LRU ==
    /// Returns the least recently used key without removing it.
    pub fn peek_lru(&self) -> Option<&String> {
        self.order.front()
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
