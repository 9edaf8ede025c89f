//! Disk Prune Task
//!
//! Background task that periodically removes expired entries from the
//! durable tier. Lazy expiry on read keeps correctness without it; this
//! bounds storage growth for entries that are never read again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task pruning the disk tier at a fixed interval.
///
/// Returns the task's JoinHandle so it can be aborted during graceful
/// shutdown.
pub fn spawn_prune_task(
    cache: Arc<RwLock<CacheStore>>,
    prune_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(prune_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting disk prune task with interval of {} seconds",
            prune_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut guard = cache.write().await;
                guard.prune_disk()
            };

            if removed > 0 {
                info!("Disk prune: removed {} expired entries", removed);
            } else {
                debug!("Disk prune: nothing expired");
            }
        }
    })
}
