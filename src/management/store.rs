//! Expiring key-value storage.
//!
//! All shared state of the relay (pending OAuth state tokens, the single
//! token record) lives behind the [`KvStore`] trait: an asynchronous
//! string-keyed store with per-key get/put/delete and optional expiry.
//! Expired entries read as absent; callers never observe a stale value.

use std::{collections::HashMap, io::ErrorKind, path::PathBuf, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// An opaque, asynchronous string-keyed store.
///
/// Per-key operations are atomic at the granularity of a single
/// get/put/delete; no cross-key transactions are offered or needed.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Reads a key. Returns `None` for keys never written or already expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes a key, replacing any previous value. With a `ttl` the entry
    /// silently disappears once the duration has elapsed.
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Removes a key. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn new(value: &str, ttl: Option<Duration>) -> Self {
        Entry {
            value: value.to_string(),
            expires_at: ttl.and_then(|d| {
                chrono::Duration::from_std(d)
                    .ok()
                    .map(|d| Utc::now() + d)
            }),
        }
    }

    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(at) => Utc::now() >= at,
            None => false,
        }
    }
}

/// In-memory store used by tests and by `serve --memory-store`.
///
/// Contents die with the process, which matches the transient nature of
/// everything the relay keeps: state tokens live 10 minutes, the token
/// record one hour.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), Entry::new(value, ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
        Ok(())
    }
}

/// File-backed store persisting one JSON document per key under the
/// platform-specific local data directory.
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    pub fn new(base: PathBuf) -> Self {
        FileStore { base }
    }

    /// Store rooted at the default location, e.g.
    /// `~/.local/share/sporelay/store` on Linux.
    pub fn default_path() -> Self {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("sporelay/store");
        Self::new(path)
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        // Keys are internal identifiers (alphanumeric plus underscore), safe
        // to use as file names directly.
        self.base.join(format!("{}.json", key))
    }
}

#[async_trait]
impl KvStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.entry_path(key);
        let json = match async_fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entry: Entry = serde_json::from_str(&json)?;
        if entry.is_expired() {
            let _ = async_fs::remove_file(&path).await;
            return Ok(None);
        }

        Ok(Some(entry.value))
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        async_fs::create_dir_all(&self.base).await?;

        let json = serde_json::to_string_pretty(&Entry::new(value, ttl))?;
        async_fs::write(self.entry_path(key), json).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        match async_fs::remove_file(self.entry_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
