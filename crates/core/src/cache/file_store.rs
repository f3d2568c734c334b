use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::{CacheEntry, CacheStore};
use crate::types::{VizkitError, VizkitResult};

/// Cache store that keeps one JSON file per entry on disk
pub struct FileCacheStore {
    cache_dir: PathBuf,
}

/// On-disk representation of a cache entry
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    expires_at: u64,
    value: JsonValue,
}

/// Information about a cached entry
#[derive(Debug, Clone)]
pub struct CachedEntryInfo {
    pub key: String,
    pub path: PathBuf,
    pub expires_at: u64,
    pub expired: bool,
}

impl FileCacheStore {
    /// Create a cache store rooted in `<root>/.vizkit/cache`
    pub fn new(root: &Path) -> Self {
        Self::with_dir(root.join(".vizkit").join("cache"))
    }

    /// Create a cache store that writes directly into `cache_dir`
    pub fn with_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Ensure the cache directory exists
    pub fn initialize(&self) -> VizkitResult<()> {
        fs::create_dir_all(&self.cache_dir).map_err(|e| {
            VizkitError::Cache(format!(
                "Failed to create cache directory {}: {}",
                self.cache_dir.display(),
                e
            ))
        })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let key_hash = hex::encode(Sha256::digest(key.as_bytes()));
        self.cache_dir.join(format!("{}.json", key_hash))
    }

    fn read_entry(path: &Path) -> VizkitResult<StoredEntry> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_entry(&self, key: &str, value: JsonValue, ttl: Duration) -> VizkitResult<()> {
        self.initialize()?;

        let entry = StoredEntry {
            key: key.to_string(),
            expires_at: unix_now().saturating_add(ttl.as_secs()),
            value,
        };
        let path = self.entry_path(key);
        fs::write(&path, serde_json::to_vec(&entry)?)?;

        debug!(key, path = %path.display(), "stored cache entry");
        Ok(())
    }

    /// Get a list of all cache entries on disk
    pub fn list_entries(&self) -> VizkitResult<Vec<CachedEntryInfo>> {
        let mut entries = Vec::new();

        if !self.cache_dir.exists() {
            return Ok(entries);
        }

        let now = unix_now();
        for dir_entry in fs::read_dir(&self.cache_dir)? {
            let path = dir_entry?.path();

            if !is_entry_file(&path) {
                continue;
            }

            match Self::read_entry(&path) {
                Ok(stored) => entries.push(CachedEntryInfo {
                    key: stored.key,
                    expired: stored.expires_at <= now,
                    expires_at: stored.expires_at,
                    path,
                }),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable cache file"),
            }
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    /// Remove every entry file, and the cache directory once it is empty.
    ///
    /// Only `*.json` files holding a stored entry are deleted, so other files
    /// in a shared cache directory are left alone.
    pub fn clear(&self) -> VizkitResult<()> {
        if !self.cache_dir.exists() {
            return Ok(());
        }

        for dir_entry in fs::read_dir(&self.cache_dir)? {
            let path = dir_entry?.path();
            if !is_entry_file(&path) || Self::read_entry(&path).is_err() {
                continue;
            }
            fs::remove_file(&path).map_err(|e| {
                VizkitError::Cache(format!("Failed to remove {}: {}", path.display(), e))
            })?;
        }

        if fs::read_dir(&self.cache_dir)?.next().is_none() {
            fs::remove_dir(&self.cache_dir).map_err(|e| {
                VizkitError::Cache(format!(
                    "Failed to remove cache directory {}: {}",
                    self.cache_dir.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}

impl CacheStore for FileCacheStore {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        let path = self.entry_path(key);
        if !path.exists() {
            return None;
        }

        let stored = match Self::read_entry(&path) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(key, error = %e, "ignoring unreadable cache entry");
                return None;
            }
        };

        if stored.key != key || stored.expires_at <= unix_now() {
            if let Err(e) = fs::remove_file(&path) {
                debug!(key, path = %path.display(), error = %e, "failed to remove stale cache entry");
            }
            return None;
        }

        Some(CacheEntry {
            key: stored.key,
            value: stored.value,
        })
    }

    fn set(&self, key: &str, value: JsonValue, ttl: Duration) {
        if let Err(e) = self.write_entry(key, value, ttl) {
            warn!(key, error = %e, "failed to write cache entry");
        }
    }
}

fn is_entry_file(path: &Path) -> bool {
    path.is_file() && path.extension().map(|e| e == "json").unwrap_or(false)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
