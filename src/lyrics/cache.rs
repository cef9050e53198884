//! On-disk lyrics cache.
//!
//! One JSON document per track, named after a digest of the track identity:
//!
//! ```text
//! <cache_root>/lyrics/<sha256(title + artist + duration)>.json
//! ```
//!
//! Reads never fail: a missing, unreadable or malformed file is a miss.
//! There is no locking; a single writer process is assumed.

use crate::lyrics::types::{CacheRecord, TrackIdentity};
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("cache JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Digest of the concatenated title, artist and duration. Case-sensitive,
/// no normalization.
pub fn cache_key(identity: &TrackIdentity) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identity.title.as_bytes());
    hasher.update(identity.artist.as_bytes());
    hasher.update(identity.duration.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(cache_root: &Path) -> Self {
        Self {
            dir: cache_root.join("lyrics"),
        }
    }

    fn path_for(&self, hash: &str) -> PathBuf {
        self.dir.join(format!("{hash}.json"))
    }

    pub async fn get(&self, hash: &str) -> Option<CacheRecord> {
        let path = self.path_for(hash);
        let contents = match fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Unreadable cache entry");
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Malformed cache entry");
                None
            }
        }
    }

    /// Write a record, creating the cache directory on first use.
    pub async fn put(&self, hash: &str, record: &CacheRecord) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_string(record)?;
        let path = self.path_for(hash);
        let tmp = path.with_extension("json.tmp");

        let mut file = fs::File::create(&tmp).await?;
        file.write_all(json.as_bytes()).await?;
        file.flush().await?;
        drop(file);
        fs::rename(&tmp, &path).await?;

        tracing::debug!(path = %path.display(), "Cached lyrics");
        Ok(())
    }

    /// Delete a record. Missing records are fine.
    pub async fn remove(&self, hash: &str) {
        let path = self.path_for(hash);
        match fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed cache entry"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove cache entry")
            }
        }
    }
}
