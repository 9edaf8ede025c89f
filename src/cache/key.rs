//! Cache Key Module
//!
//! Deterministic, order-independent encoding of (feed name, parameters).

use std::collections::BTreeMap;
use std::fmt;

use sha2::{Digest, Sha256};

use crate::error::{FeedError, Result};

/// Parameters attached to a fetch task.
///
/// A BTreeMap so that iteration order, and therefore key encoding, never
/// depends on insertion order.
pub type FeedParams = BTreeMap<String, String>;

// == Cache Key ==
/// Canonical cache key for one (feed, parameters) request.
///
/// Two logically identical requests always produce an identical key; the
/// canonical form is `name|k:v|k:v...` with parameters in sorted order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    name: String,
    canonical: String,
}

impl CacheKey {
    /// Builds a key from a feed name and its parameters.
    ///
    /// Rejects empty feed names and names containing the `|` separator,
    /// which would make the encoding ambiguous.
    pub fn new(name: &str, params: &FeedParams) -> Result<Self> {
        if name.is_empty() {
            return Err(FeedError::InvalidKey("feed name is empty".to_string()));
        }
        if name.contains('|') {
            return Err(FeedError::InvalidKey(format!(
                "feed name '{}' contains reserved separator '|'",
                name
            )));
        }

        let mut canonical = name.to_string();
        for (k, v) in params {
            canonical.push('|');
            canonical.push_str(k);
            canonical.push(':');
            canonical.push_str(v);
        }

        Ok(Self {
            name: name.to_string(),
            canonical,
        })
    }

    /// The feed name component of the key.
    pub fn feed_name(&self) -> &str {
        &self.name
    }

    /// Canonical string form, used as the map key in both tiers.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// SHA-256 hex digest of the canonical form.
    ///
    /// Names the durable-tier file so keys with arbitrary parameter
    /// characters stay filesystem-safe.
    pub fn file_stem(&self) -> String {
        format!("{:x}", Sha256::digest(self.canonical.as_bytes()))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}
