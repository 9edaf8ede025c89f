//! Disk Tier Module
//!
//! Durable tier: one JSON file per entry, named by the key's SHA-256 digest.
//! Every I/O failure here degrades to a miss and is logged; nothing is
//! raised past the cache store boundary.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheKey};

// == Disk Tier ==
/// On-disk tier persisting entries across process restarts.
///
/// No hard capacity bound; growth is contained by lazy expiry on read and
/// periodic pruning of expired entries.
#[derive(Debug, Clone)]
pub struct DiskTier {
    root: PathBuf,
}

impl DiskTier {
    // == Constructor ==
    /// Opens (creating if necessary) the cache directory.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let root = dir.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.root.join(format!("{}.json", key.file_stem()))
    }

    // == Get ==
    /// Reads an entry; expired or unreadable files are removed and treated
    /// as a miss.
    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let path = self.path_for(key);
        let entry = match read_entry(&path) {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(err) => {
                warn!("Unreadable cache file {}: {}", path.display(), err);
                remove_file_quiet(&path);
                return None;
            }
        };

        if entry.is_expired() {
            remove_file_quiet(&path);
            return None;
        }
        Some(entry)
    }

    // == Put ==
    /// Writes an entry, best-effort. A failed write leaves the memory tier
    /// as the only copy.
    pub fn put(&self, key: &CacheKey, entry: &CacheEntry) {
        let path = self.path_for(key);
        let encoded = match serde_json::to_vec(entry) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("Failed to serialize cache entry {}: {}", key, err);
                return;
            }
        };
        if let Err(err) = fs::write(&path, encoded) {
            warn!("Failed to write cache file {}: {}", path.display(), err);
        }
    }

    // == Remove ==
    /// Removes the file for a key. Idempotent.
    pub fn remove(&self, key: &CacheKey) -> bool {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => true,
            Err(err) if err.kind() == io::ErrorKind::NotFound => false,
            Err(err) => {
                warn!("Failed to remove cache file {}: {}", path.display(), err);
                false
            }
        }
    }

    // == Remove Feed ==
    /// Removes every stored entry belonging to the given feed.
    ///
    /// File names are digests, so this scans the directory and inspects the
    /// canonical key recorded inside each entry.
    pub fn remove_feed(&self, feed: &str) -> usize {
        let prefix = format!("{}|", feed);
        let mut removed = 0;

        for path in self.entry_files() {
            match read_entry(&path) {
                Ok(Some(entry)) if entry.key == feed || entry.key.starts_with(&prefix) => {
                    remove_file_quiet(&path);
                    removed += 1;
                }
                Ok(_) => {}
                Err(_) => {
                    // Unreadable files are dropped opportunistically
                    remove_file_quiet(&path);
                }
            }
        }
        removed
    }

    // == Prune Expired ==
    /// Removes expired and corrupt files. Returns the number removed.
    pub fn prune_expired(&self) -> usize {
        let mut removed = 0;

        for path in self.entry_files() {
            let expired = match read_entry(&path) {
                Ok(Some(entry)) => entry.is_expired(),
                Ok(None) => false,
                Err(_) => true,
            };
            if expired {
                remove_file_quiet(&path);
                removed += 1;
            }
        }

        if removed > 0 {
            debug!("Disk prune removed {} entries", removed);
        }
        removed
    }

    // == Clear ==
    /// Removes all entry files.
    pub fn clear(&self) -> usize {
        let mut removed = 0;
        for path in self.entry_files() {
            remove_file_quiet(&path);
            removed += 1;
        }
        removed
    }

    /// Number of entry files currently on disk (expired ones included).
    pub fn file_count(&self) -> usize {
        self.entry_files().len()
    }

    /// Directory backing this tier.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_files(&self) -> Vec<PathBuf> {
        let dir = match fs::read_dir(&self.root) {
            Ok(dir) => dir,
            Err(err) => {
                warn!("Cannot list cache dir {}: {}", self.root.display(), err);
                return Vec::new();
            }
        };

        dir.filter_map(|res| res.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|ext| ext == "json").unwrap_or(false))
            .collect()
    }
}

fn read_entry(path: &Path) -> io::Result<Option<CacheEntry>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

fn remove_file_quiet(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        if err.kind() != io::ErrorKind::NotFound {
            warn!("Failed to remove cache file {}: {}", path.display(), err);
        }
    }
}
