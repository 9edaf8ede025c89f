//! Fetch Orchestrator Module
//!
//! Resolves batches of fetch tasks concurrently: cache first, then the
//! origin through the single-flight coordinator. Each task gets exactly one
//! outcome; a slow or failing task never blocks or invalidates its
//! siblings.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::cache::{CacheEntry, CacheKey, CacheStore, CacheTier, FeedParams};
use crate::error::FeedError;
use crate::monitor::{OutcomeKind, PerformanceMonitor};
use crate::singleflight::{FlightError, SingleFlight};

// == Origin Function ==
/// Future returned by an origin fetch function.
pub type OriginFuture = Pin<Box<dyn Future<Output = Result<Value, FeedError>> + Send>>;

/// Opaque fetch function for one feed: parameters in, payload or error out.
///
/// Supplied by the data-access collaborator; the orchestrator never looks
/// inside it.
pub type OriginFn = Arc<dyn Fn(FeedParams) -> OriginFuture + Send + Sync>;

// == Fetch Task ==
/// One named fetch request. Immutable once submitted.
#[derive(Clone)]
pub struct FetchTask {
    pub name: String,
    pub params: FeedParams,
    pub ttl_override: Option<Duration>,
    pub timeout: Duration,
    pub origin: OriginFn,
}

impl FetchTask {
    /// Creates a task with empty parameters and a 30 second timeout.
    pub fn new(name: impl Into<String>, origin: OriginFn) -> Self {
        Self {
            name: name.into(),
            params: FeedParams::new(),
            ttl_override: None,
            timeout: Duration::from_secs(30),
            origin,
        }
    }

    pub fn with_params(mut self, params: FeedParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_override = Some(ttl);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for FetchTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchTask")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("ttl_override", &self.ttl_override)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

// == Fetch Outcome ==
/// Exactly one of these per resolved task.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// A valid cached entry was found; no origin call
    CacheHit { tier: CacheTier, entry: CacheEntry },
    /// The origin was fetched and the result cached
    Fresh {
        entry: CacheEntry,
        fetch_duration_ms: u64,
    },
    /// The origin fetch failed
    Failed { reason: String },
    /// The task's timeout elapsed before a result arrived
    TimedOut,
}

/// One outcome per submitted task, keyed by task name.
pub type BatchResult = HashMap<String, FetchOutcome>;

// == Orchestrator ==
/// Resolves fetch tasks against the cache store and single-flight
/// coordinator, reporting every step to the performance monitor.
pub struct Orchestrator {
    cache: Arc<RwLock<CacheStore>>,
    flight: Arc<SingleFlight>,
    monitor: Arc<PerformanceMonitor>,
}

impl Orchestrator {
    // == Constructor ==
    pub fn new(cache: Arc<RwLock<CacheStore>>, monitor: Arc<PerformanceMonitor>) -> Self {
        Self {
            cache,
            flight: Arc::new(SingleFlight::new()),
            monitor,
        }
    }

    /// Shared handle to the cache store.
    pub fn cache(&self) -> Arc<RwLock<CacheStore>> {
        Arc::clone(&self.cache)
    }

    /// Shared handle to the performance monitor.
    pub fn monitor(&self) -> Arc<PerformanceMonitor> {
        Arc::clone(&self.monitor)
    }

    // == Resolve Batch ==
    /// Resolves every task concurrently and returns one outcome per task.
    ///
    /// There is no partial abort: the batch completes once each task has
    /// produced an outcome, in whatever order they finish.
    pub async fn resolve_batch(&self, tasks: Vec<FetchTask>) -> BatchResult {
        let mut handles = Vec::with_capacity(tasks.len());
        for task in tasks {
            let cache = Arc::clone(&self.cache);
            let flight = Arc::clone(&self.flight);
            let monitor = Arc::clone(&self.monitor);
            let name = task.name.clone();
            handles.push((
                name,
                tokio::spawn(resolve_one(cache, flight, monitor, task)),
            ));
        }

        let mut results = BatchResult::with_capacity(handles.len());
        for (name, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!("Fetch task for {} panicked: {}", name, err);
                    FetchOutcome::Failed {
                        reason: format!("fetch task aborted: {}", err),
                    }
                }
            };
            results.insert(name, outcome);
        }
        results
    }

    // == Resolve ==
    /// Resolves a single task.
    pub async fn resolve(&self, task: FetchTask) -> FetchOutcome {
        resolve_one(
            Arc::clone(&self.cache),
            Arc::clone(&self.flight),
            Arc::clone(&self.monitor),
            task,
        )
        .await
    }
}

/// Cache check, then single-flight origin fetch, with monitoring around
/// both. The fetch-and-store future handed to the coordinator runs
/// detached, so the cache write survives this waiter's timeout.
async fn resolve_one(
    cache: Arc<RwLock<CacheStore>>,
    flight: Arc<SingleFlight>,
    monitor: Arc<PerformanceMonitor>,
    task: FetchTask,
) -> FetchOutcome {
    // Malformed descriptors are rejected before any scheduling
    let key = match CacheKey::new(&task.name, &task.params) {
        Ok(key) => key,
        Err(err) => {
            return FetchOutcome::Failed {
                reason: err.to_string(),
            }
        }
    };

    let operation = format!("fetch.{}", task.name);
    let started = Instant::now();

    let cached = cache.write().await.get(&key);
    if let Some(entry) = cached {
        monitor.record(&operation, started.elapsed(), OutcomeKind::CacheHit);
        return FetchOutcome::CacheHit {
            tier: entry.tier,
            entry,
        };
    }

    info!("Cache miss for {}, fetching from origin", key);
    let fetch = {
        let cache = Arc::clone(&cache);
        let origin = Arc::clone(&task.origin);
        let params = task.params.clone();
        let key = key.clone();
        let ttl = task.ttl_override;
        async move {
            let payload = (origin)(params).await?;
            Ok(cache.write().await.put(&key, payload, ttl))
        }
    };

    match flight.resolve(&key, task.timeout, fetch).await {
        Ok((entry, fetch_duration_ms)) => {
            monitor.record(&operation, started.elapsed(), OutcomeKind::Fresh);
            FetchOutcome::Fresh {
                entry,
                fetch_duration_ms,
            }
        }
        Err(FlightError::Origin(reason)) => {
            warn!("Origin fetch for {} failed: {}", key, reason);
            monitor.record(&operation, started.elapsed(), OutcomeKind::Failed);
            FetchOutcome::Failed { reason }
        }
        Err(FlightError::TimedOut) => {
            warn!(
                "Fetch for {} timed out after {} ms",
                key,
                task.timeout.as_millis()
            );
            monitor.record(&operation, started.elapsed(), OutcomeKind::TimedOut);
            FetchOutcome::TimedOut
        }
    }
}
