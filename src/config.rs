//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the memory tier can hold
    pub memory_max_entries: usize,
    /// Aggregate payload byte budget for the memory tier
    pub memory_max_bytes: usize,
    /// Default TTL in seconds for entries without a per-feed TTL
    pub default_ttl_secs: u64,
    /// Per-task fetch timeout in seconds
    pub fetch_timeout_secs: u64,
    /// Directory backing the durable tier
    pub disk_cache_dir: String,
    /// Durable-tier prune interval in seconds
    pub prune_interval_secs: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMORY_MAX_ENTRIES` - Memory tier entry capacity (default: 256)
    /// - `MEMORY_MAX_BYTES` - Memory tier byte budget (default: 64 MiB)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 3600)
    /// - `FETCH_TIMEOUT` - Per-task fetch timeout in seconds (default: 30)
    /// - `DISK_CACHE_DIR` - Durable tier directory (default: data/cache)
    /// - `PRUNE_INTERVAL` - Disk prune frequency in seconds (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        Self {
            memory_max_entries: env::var("MEMORY_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(256),
            memory_max_bytes: env::var("MEMORY_MAX_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(64 * 1024 * 1024),
            default_ttl_secs: env::var("DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            fetch_timeout_secs: env::var("FETCH_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            disk_cache_dir: env::var("DISK_CACHE_DIR")
                .unwrap_or_else(|_| "data/cache".to_string()),
            prune_interval_secs: env::var("PRUNE_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        }
    }

    /// Default TTL as a [`Duration`].
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    /// Per-task fetch timeout as a [`Duration`].
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memory_max_entries: 256,
            memory_max_bytes: 64 * 1024 * 1024,
            default_ttl_secs: 3600,
            fetch_timeout_secs: 30,
            disk_cache_dir: "data/cache".to_string(),
            prune_interval_secs: 300,
            server_port: 3000,
        }
    }
}
