//! Feed Registry Module
//!
//! Maps feed names to their TTL, timeout, default parameters, and origin
//! fetch function, and builds fetch tasks from them.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::cache::FeedParams;
use crate::error::{FeedError, Result};
use crate::orchestrator::{FetchTask, OriginFn};

// == Feed Spec ==
/// Registration record for one feed.
#[derive(Clone)]
pub struct FeedSpec {
    pub name: String,
    /// Time-to-live for cached results of this feed
    pub ttl: Duration,
    /// Per-task fetch timeout
    pub timeout: Duration,
    /// Parameters applied when the caller supplies none
    pub default_params: FeedParams,
    /// Opaque fetch function reaching the feed's origin
    pub origin: OriginFn,
}

impl fmt::Debug for FeedSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedSpec")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .field("timeout", &self.timeout)
            .field("default_params", &self.default_params)
            .finish_non_exhaustive()
    }
}

// == Feed Registry ==
/// The fixed set of feeds this process knows how to fetch.
#[derive(Debug, Default)]
pub struct FeedRegistry {
    feeds: BTreeMap<String, FeedSpec>,
}

impl FeedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // == Register ==
    /// Adds or replaces a feed registration.
    pub fn register(&mut self, spec: FeedSpec) {
        self.feeds.insert(spec.name.clone(), spec);
    }

    /// Whether a feed is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.feeds.contains_key(name)
    }

    /// Registered feed names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.feeds.keys().cloned().collect()
    }

    /// Number of registered feeds.
    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    // == Task ==
    /// Builds a fetch task for one feed, merging caller parameters over the
    /// feed's defaults.
    pub fn task(&self, name: &str, overrides: FeedParams) -> Result<FetchTask> {
        let spec = self
            .feeds
            .get(name)
            .ok_or_else(|| FeedError::UnknownFeed(name.to_string()))?;

        let mut params = spec.default_params.clone();
        params.extend(overrides);

        Ok(FetchTask::new(&spec.name, OriginFn::clone(&spec.origin))
            .with_params(params)
            .with_ttl(spec.ttl)
            .with_timeout(spec.timeout))
    }

    // == Tasks For All ==
    /// Builds one default-parameter task per registered feed.
    pub fn tasks_for_all(&self) -> Vec<FetchTask> {
        self.feeds
            .keys()
            .filter_map(|name| self.task(name, FeedParams::new()).ok())
            .collect()
    }
}
