//! Single-Flight Coordinator
//!
//! Ensures at most one in-flight origin fetch per cache key. The first
//! caller for a key becomes the leader and its fetch runs in a detached
//! task; callers arriving while it runs become followers and receive the
//! leader's outcome without a second origin invocation.
//!
//! Waiter timeouts are independent of the fetch itself: a waiter that gives
//! up returns `TimedOut` while the detached fetch keeps running, so its
//! eventual result can still land in the cache for future requests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tracing::debug;

use crate::cache::{CacheEntry, CacheKey};
use crate::error::FeedError;

/// Outcome broadcast from the leader's fetch to every waiter.
///
/// Success carries the cached entry and the fetch duration in milliseconds.
type FlightResult = Result<(CacheEntry, u64), OriginFailure>;

type InflightMap = Arc<Mutex<HashMap<String, broadcast::Sender<FlightResult>>>>;

/// Clonable failure carried over the broadcast channel.
#[derive(Debug, Clone)]
struct OriginFailure(String);

/// Error returned to one waiter of a flight.
#[derive(Debug)]
pub enum FlightError {
    /// The leader's fetch failed; every waiter sees the same reason
    Origin(String),
    /// This waiter's own timeout elapsed before the leader finished
    TimedOut,
}

/// Clears a key's leadership when the leader task exits, normally or by
/// panic. A wedged entry would make every later request for the key wait on
/// a channel that never fires.
struct FlightGuard {
    map: InflightMap,
    key: String,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.map
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

// == Single-Flight Coordinator ==
/// Deduplicates concurrent origin fetches per cache key.
#[derive(Debug, Default)]
pub struct SingleFlight {
    inflight: InflightMap,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    // == Resolve ==
    /// Runs `fetch` for the key unless one is already in flight, then waits
    /// up to `timeout` for the result.
    ///
    /// The fetch runs in a detached task and is expected to perform the
    /// cache write itself; leadership for the key is cleared once it
    /// completes, whatever the outcome.
    pub async fn resolve<Fut>(
        &self,
        key: &CacheKey,
        timeout: Duration,
        fetch: Fut,
    ) -> Result<(CacheEntry, u64), FlightError>
    where
        Fut: std::future::Future<Output = Result<CacheEntry, FeedError>> + Send + 'static,
    {
        let canonical = key.as_str().to_string();

        let mut rx = {
            let mut inflight = self
                .inflight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            match inflight.get(&canonical) {
                Some(tx) => {
                    debug!("Joining in-flight fetch for {}", canonical);
                    tx.subscribe()
                }
                None => {
                    let (tx, rx) = broadcast::channel(1);
                    inflight.insert(canonical.clone(), tx.clone());

                    let guard = FlightGuard {
                        map: Arc::clone(&self.inflight),
                        key: canonical.clone(),
                    };
                    tokio::spawn(async move {
                        let started = Instant::now();
                        let result: FlightResult = match fetch.await {
                            Ok(entry) => Ok((entry, started.elapsed().as_millis() as u64)),
                            Err(err) => Err(OriginFailure(err.to_string())),
                        };

                        // Clear leadership before publishing so the next
                        // request for this key starts a fresh flight. If the
                        // fetch panicked, dropping the guard during unwind
                        // does the same and dropping the sender wakes the
                        // waiters with a closed channel.
                        drop(guard);
                        let _ = tx.send(result);
                    });
                    rx
                }
            }
        };

        match tokio::time::timeout(timeout, rx.recv()).await {
            Ok(Ok(Ok((entry, fetch_ms)))) => Ok((entry, fetch_ms)),
            Ok(Ok(Err(OriginFailure(reason)))) => Err(FlightError::Origin(reason)),
            Ok(Err(_closed)) => Err(FlightError::Origin(
                "origin task aborted before completing".to_string(),
            )),
            Err(_elapsed) => Err(FlightError::TimedOut),
        }
    }

    /// Number of keys currently holding an in-flight fetch.
    pub fn inflight_count(&self) -> usize {
        self.inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::key::FeedParams;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key(name: &str) -> CacheKey {
        CacheKey::new(name, &FeedParams::new()).unwrap()
    }

    fn entry(name: &str) -> CacheEntry {
        CacheEntry::new(name.to_string(), json!(1), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_single_resolve_runs_fetch() {
        let flight = SingleFlight::new();
        let (got, _ms) = flight
            .resolve(&key("claims"), Duration::from_secs(1), async {
                Ok(entry("claims"))
            })
            .await
            .unwrap();

        assert_eq!(got.key, "claims");
        assert_eq!(flight.inflight_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_resolves_share_one_fetch() {
        let flight = Arc::new(SingleFlight::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let flight = Arc::clone(&flight);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                flight
                    .resolve(&key("pce"), Duration::from_secs(2), async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(entry("pce"))
                    })
                    .await
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1, "origin must run once");
    }

    #[tokio::test]
    async fn test_followers_see_leader_failure() {
        let flight = Arc::new(SingleFlight::new());

        let leader = {
            let flight = Arc::clone(&flight);
            tokio::spawn(async move {
                flight
                    .resolve(&key("bad"), Duration::from_secs(1), async {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Err(FeedError::Origin("upstream 503".to_string()))
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        let follower = flight
            .resolve(&key("bad"), Duration::from_secs(1), async {
                Ok(entry("bad")) // must not run
            })
            .await;

        assert!(matches!(leader.await.unwrap(), Err(FlightError::Origin(_))));
        match follower {
            Err(FlightError::Origin(reason)) => assert!(reason.contains("upstream 503")),
            other => panic!("expected origin failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_waiter_timeout_does_not_cancel_fetch() {
        let flight = Arc::new(SingleFlight::new());
        let finished = Arc::new(AtomicUsize::new(0));

        let result = {
            let finished = Arc::clone(&finished);
            flight
                .resolve(&key("slow"), Duration::from_millis(50), async move {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    finished.fetch_add(1, Ordering::SeqCst);
                    Ok(entry("slow"))
                })
                .await
        };
        assert!(matches!(result, Err(FlightError::TimedOut)));

        // The detached fetch keeps running and completes on its own
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 1);
        assert_eq!(flight.inflight_count(), 0);
    }

    #[tokio::test]
    async fn test_leadership_cleared_after_panicked_fetch() {
        let flight = SingleFlight::new();

        let first = flight
            .resolve(&key("crash"), Duration::from_millis(500), async {
                if true {
                    panic!("origin blew up");
                }
                Ok(entry("crash"))
            })
            .await;
        match first {
            Err(FlightError::Origin(reason)) => assert!(reason.contains("aborted")),
            other => panic!("expected origin failure, got {:?}", other),
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(flight.inflight_count(), 0, "panicked leader must release the key");

        // The key accepts a fresh leader immediately
        let second = flight
            .resolve(&key("crash"), Duration::from_secs(1), async {
                Ok(entry("crash"))
            })
            .await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_leadership_cleared_after_failure() {
        let flight = SingleFlight::new();

        let first = flight
            .resolve(&key("retry"), Duration::from_secs(1), async {
                Err(FeedError::Origin("boom".to_string()))
            })
            .await;
        assert!(first.is_err());

        // A later request gets a fresh leader, not the stale failure
        let second = flight
            .resolve(&key("retry"), Duration::from_secs(1), async {
                Ok(entry("retry"))
            })
            .await;
        assert!(second.is_ok());
    }
}
