//! Content fingerprints for search-index payloads.
//!
//! A payload is replaced wholesale on every documentation rebuild, so a hash of
//! its bytes is enough to tell whether anything derived from it is stale.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use xxhash_rust::xxh3::xxh3_64;

/// Fingerprint of a payload's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    /// xxh3-64 of the raw bytes
    pub hash: u64,
    /// Length in bytes
    pub len: u64,
}

impl Fingerprint {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self {
            hash: xxh3_64(bytes),
            len: bytes.len() as u64,
        }
    }

    /// Fingerprint the current contents of a file.
    pub async fn of_file(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::of_bytes(&bytes))
    }

    /// Lowercase hex form, usable as a file name.
    pub fn as_hex(&self) -> String {
        format!("{:016x}-{:x}", self.hash, self.len)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}
