//! Cache stores for fetched source payloads.
//!
//! Sources look up raw payloads under a deterministic key before going to the
//! network and store whatever they fetched afterwards. Entries disappear only
//! when their time-to-live runs out; concurrent writers simply overwrite each
//! other.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};

pub mod file_store;

pub use file_store::FileCacheStore;

/// Lifetimes, in seconds, an editor can pick for cached payloads.
pub const CACHE_EXPIRY_OPTIONS: [u64; 8] = [
    0, 1800, 3600, 21600, 86400, 604800, 2592000, 15552000,
];

/// Configured lifetime of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheExpiry {
    /// Use the host-wide default lifetime.
    #[default]
    Default,
    /// Explicit lifetime. Zero disables caching.
    Seconds(u64),
}

impl CacheExpiry {
    /// Resolve against the global default. `None` means "do not cache".
    pub fn ttl(self, default_secs: u64) -> Option<Duration> {
        let secs = match self {
            Self::Default => default_secs,
            Self::Seconds(secs) => secs,
        };
        (secs > 0).then(|| Duration::from_secs(secs))
    }

    /// Select options for the cache-expiry form element.
    pub fn form_options() -> IndexMap<String, String> {
        let mut options = IndexMap::new();
        options.insert("default".to_string(), "Global default".to_string());
        for secs in CACHE_EXPIRY_OPTIONS {
            options.insert(secs.to_string(), describe_secs(secs));
        }
        options
    }
}

fn describe_secs(secs: u64) -> String {
    match secs {
        0 => "Never cache".to_string(),
        s if s % 86400 == 0 => plural(s / 86400, "day"),
        s if s % 3600 == 0 => plural(s / 3600, "hour"),
        s => plural(s / 60, "minute"),
    }
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Build the cache key for one kind of payload of one resource.
///
/// The key is a pure function of its inputs: identical configuration always
/// hits the same entry, and `fields` and `records` never collide.
pub fn cache_key(plugin_key: &str, resource_id: &str, object_type: &str) -> String {
    let digest = Sha256::digest(format!("{}\0{}\0{}", plugin_key, resource_id, object_type));
    format!("{}:{}", plugin_key, hex::encode(digest))
}

/// A cached payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub value: JsonValue,
}

/// Storage backend for cached payloads.
pub trait CacheStore: Send + Sync {
    /// Return the live entry stored under `key`, if any.
    fn get(&self, key: &str) -> Option<CacheEntry>;

    /// Store `value` under `key` for `ttl`, replacing any previous entry.
    fn set(&self, key: &str, value: JsonValue, ttl: Duration);
}

/// In-process cache store.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, (JsonValue, Instant)>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some((value, expires_at)) if Instant::now() < *expires_at => Some(CacheEntry {
                key: key.to_string(),
                value: value.clone(),
            }),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: JsonValue, ttl: Duration) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), (value, Instant::now() + ttl));
        }
    }
}
