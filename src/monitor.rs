//! Performance Monitor Module
//!
//! Passive observation of fetch and cache operations. Samples go into a
//! bounded ring buffer per operation (oldest dropped first) and are only
//! ever consumed in aggregate. Recording never affects the observed
//! operation.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;

use crate::cache::current_timestamp_ms;

/// Retained samples per operation.
pub const DEFAULT_SAMPLE_CAPACITY: usize = 1000;

// == Outcome Kind ==
/// How an observed operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Served from cache
    CacheHit,
    /// Fetched fresh from the origin
    Fresh,
    /// Origin fetch failed
    Failed,
    /// Waiter timed out
    TimedOut,
}

impl OutcomeKind {
    fn is_error(self) -> bool {
        matches!(self, OutcomeKind::Failed | OutcomeKind::TimedOut)
    }
}

// == Performance Sample ==
/// One observed operation. Append-only.
#[derive(Debug, Clone)]
pub struct PerformanceSample {
    pub started_at: u64,
    pub duration_ms: u64,
    pub outcome: OutcomeKind,
}

// == Operation Stats ==
/// Aggregate view over one operation's retained samples.
#[derive(Debug, Clone, Serialize)]
pub struct OperationStats {
    pub count: usize,
    pub error_rate: f64,
    pub avg_ms: f64,
    pub min_ms: u64,
    pub max_ms: u64,
    pub p50_ms: u64,
    pub p95_ms: u64,
}

// == Performance Monitor ==
/// Records duration/outcome samples keyed by operation name.
#[derive(Debug)]
pub struct PerformanceMonitor {
    samples: Mutex<HashMap<String, VecDeque<PerformanceSample>>>,
    capacity: usize,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_CAPACITY)
    }
}

impl PerformanceMonitor {
    // == Constructor ==
    /// Creates a monitor retaining at most `capacity` samples per operation.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    // == Record ==
    /// Appends a sample for the operation, dropping the oldest when the
    /// ring buffer is full. Infallible by contract: a poisoned lock is
    /// ignored rather than propagated to the observed operation.
    pub fn record(&self, operation: &str, duration: Duration, outcome: OutcomeKind) {
        let sample = PerformanceSample {
            started_at: current_timestamp_ms().saturating_sub(duration.as_millis() as u64),
            duration_ms: duration.as_millis() as u64,
            outcome,
        };

        if let Ok(mut map) = self.samples.lock() {
            let ring = map.entry(operation.to_string()).or_default();
            if ring.len() >= self.capacity {
                ring.pop_front();
            }
            ring.push_back(sample);
        }
    }

    // == Stats ==
    /// Aggregates the retained samples for one operation.
    pub fn stats(&self, operation: &str) -> Option<OperationStats> {
        let map = self.samples.lock().ok()?;
        let ring = map.get(operation)?;
        aggregate(ring)
    }

    // == All Stats ==
    /// Aggregates every tracked operation, sorted by name.
    pub fn all_stats(&self) -> BTreeMap<String, OperationStats> {
        let mut out = BTreeMap::new();
        if let Ok(map) = self.samples.lock() {
            for (name, ring) in map.iter() {
                if let Some(stats) = aggregate(ring) {
                    out.insert(name.clone(), stats);
                }
            }
        }
        out
    }

    // == Reset ==
    /// Drops all retained samples.
    pub fn reset(&self) {
        if let Ok(mut map) = self.samples.lock() {
            map.clear();
        }
    }
}

fn aggregate(ring: &VecDeque<PerformanceSample>) -> Option<OperationStats> {
    if ring.is_empty() {
        return None;
    }

    let count = ring.len();
    let errors = ring.iter().filter(|s| s.outcome.is_error()).count();
    let mut durations: Vec<u64> = ring.iter().map(|s| s.duration_ms).collect();
    durations.sort_unstable();

    let total: u64 = durations.iter().sum();
    Some(OperationStats {
        count,
        error_rate: errors as f64 / count as f64,
        avg_ms: total as f64 / count as f64,
        min_ms: durations[0],
        max_ms: durations[count - 1],
        p50_ms: percentile(&durations, 0.50),
        p95_ms: percentile(&durations, 0.95),
    })
}

fn percentile(sorted: &[u64], q: f64) -> u64 {
    let idx = ((sorted.len() - 1) as f64 * q).round() as usize;
    sorted[idx]
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_monitor_has_no_stats() {
        let monitor = PerformanceMonitor::default();
        assert!(monitor.stats("fetch.claims").is_none());
        assert!(monitor.all_stats().is_empty());
    }

    #[test]
    fn test_record_and_aggregate() {
        let monitor = PerformanceMonitor::default();
        for ms in [10, 20, 30, 40] {
            monitor.record("fetch.pce", Duration::from_millis(ms), OutcomeKind::Fresh);
        }

        let stats = monitor.stats("fetch.pce").unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.error_rate, 0.0);
        assert_eq!(stats.min_ms, 10);
        assert_eq!(stats.max_ms, 40);
        assert!((stats.avg_ms - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_error_rate_counts_failures_and_timeouts() {
        let monitor = PerformanceMonitor::default();
        monitor.record("fetch.x", Duration::from_millis(5), OutcomeKind::Fresh);
        monitor.record("fetch.x", Duration::from_millis(5), OutcomeKind::Failed);
        monitor.record("fetch.x", Duration::from_millis(5), OutcomeKind::TimedOut);
        monitor.record("fetch.x", Duration::from_millis(5), OutcomeKind::CacheHit);

        let stats = monitor.stats("fetch.x").unwrap();
        assert!((stats.error_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ring_buffer_drops_oldest() {
        let monitor = PerformanceMonitor::new(3);
        for ms in [100, 1, 2, 3] {
            monitor.record("op", Duration::from_millis(ms), OutcomeKind::Fresh);
        }

        let stats = monitor.stats("op").unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.max_ms, 3, "oldest (100ms) sample must be dropped");
    }

    #[test]
    fn test_percentiles() {
        let monitor = PerformanceMonitor::default();
        for ms in 1..=100 {
            monitor.record("op", Duration::from_millis(ms), OutcomeKind::Fresh);
        }

        let stats = monitor.stats("op").unwrap();
        assert!((49..=51).contains(&stats.p50_ms));
        assert!((94..=96).contains(&stats.p95_ms));
    }

    #[test]
    fn test_operations_tracked_independently() {
        let monitor = PerformanceMonitor::default();
        monitor.record("a", Duration::from_millis(1), OutcomeKind::Fresh);
        monitor.record("b", Duration::from_millis(2), OutcomeKind::Failed);

        assert_eq!(monitor.stats("a").unwrap().error_rate, 0.0);
        assert_eq!(monitor.stats("b").unwrap().error_rate, 1.0);
        assert_eq!(monitor.all_stats().len(), 2);
    }

    #[test]
    fn test_reset() {
        let monitor = PerformanceMonitor::default();
        monitor.record("op", Duration::from_millis(1), OutcomeKind::Fresh);
        monitor.reset();
        assert!(monitor.stats("op").is_none());
    }
}
