//! Key-value storage backends for the result cache.
//!
//! The cache only needs four string operations, so anything that can
//! read, write, delete and list keys by prefix can back it.

use dashmap::DashMap;
use std::collections::HashMap;
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store capacity exceeded ({needed} bytes needed, limit {limit})")]
    CapacityExceeded { needed: usize, limit: usize },

    #[error("store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// String key-value storage consumed by [`crate::GeoCache`].
pub trait KeyValueStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn delete(&self, key: &str) -> Result<(), StoreError>;

    fn list_keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }

    fn list_keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        (**self).list_keys_with_prefix(prefix)
    }
}

fn entry_bytes(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

fn check_capacity(
    limit: Option<usize>,
    used: usize,
    replaced: usize,
    added: usize,
) -> Result<(), StoreError> {
    let Some(limit) = limit else {
        return Ok(());
    };
    let needed = used.saturating_sub(replaced) + added;
    if needed > limit {
        return Err(StoreError::CapacityExceeded { needed, limit });
    }
    Ok(())
}

// ── In-memory store ───────────────────────────────────────────────────

/// `DashMap`-backed store. Lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
    max_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes once keys plus values exceed `max_bytes`.
    pub fn with_capacity_limit(max_bytes: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_bytes: Some(max_bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn used_bytes(&self) -> usize {
        self.entries
            .iter()
            .map(|e| entry_bytes(e.key(), e.value()))
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.max_bytes.is_some() {
            let replaced = self
                .entries
                .get(key)
                .map(|v| entry_bytes(key, v.value()))
                .unwrap_or(0);
            check_capacity(
                self.max_bytes,
                self.used_bytes(),
                replaced,
                entry_bytes(key, value),
            )?;
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn list_keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.key().starts_with(prefix))
            .map(|e| e.key().clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}

// ── File-backed store ─────────────────────────────────────────────────

/// Store persisted as a single JSON object on disk.
///
/// The whole map is loaded on open and rewritten after each mutation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
    max_bytes: Option<usize>,
}

impl FileStore {
    /// Open `path`, starting empty if it is missing or unreadable.
    pub fn open(path: impl Into<PathBuf>, max_bytes: Option<usize>) -> Self {
        let path = path.into();
        let entries = match Self::load(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cache file {} unreadable, starting empty: {}", path.display(), e);
                HashMap::new()
            }
        };
        debug!("Opened cache file {} ({} keys)", path.display(), entries.len());

        Self {
            path,
            entries: Mutex::new(entries),
            max_bytes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<HashMap<String, String>, StoreError> {
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let mut file = File::open(path)?;
        let mut raw = String::new();
        file.read_to_string(&mut raw)?;
        if raw.trim().is_empty() {
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_string(entries)?;
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&self.path)?;
        file.write_all(data.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.lock();
        if self.max_bytes.is_some() {
            let used: usize = entries.iter().map(|(k, v)| entry_bytes(k, v)).sum();
            let replaced = entries.get(key).map(|v| entry_bytes(key, v)).unwrap_or(0);
            check_capacity(self.max_bytes, used, replaced, entry_bytes(key, value))?;
        }

        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist(&entries) {
            // Keep memory and disk in agreement.
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.lock();
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }

    fn list_keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self
            .lock()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join("moodmap-store-tests")
            .join(format!("{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_memory_store_basic_ops() {
        let store = MemoryStore::new();
        assert_eq!(store.read("a").unwrap(), None);

        store.write("a", "1").unwrap();
        store.write("b", "2").unwrap();
        store.write("other", "3").unwrap();
        assert_eq!(store.read("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.list_keys_with_prefix("").unwrap().len(), 3);

        store.delete("a").unwrap();
        assert_eq!(store.read("a").unwrap(), None);
        // Deleting a missing key is not an error.
        store.delete("a").unwrap();
    }

    #[test]
    fn test_memory_store_prefix_listing_is_sorted() {
        let store = MemoryStore::new();
        store.write("p_b", "x").unwrap();
        store.write("p_a", "x").unwrap();
        store.write("q_a", "x").unwrap();

        assert_eq!(store.list_keys_with_prefix("p_").unwrap(), vec!["p_a", "p_b"]);
    }

    #[test]
    fn test_memory_store_capacity_limit() {
        let store = MemoryStore::with_capacity_limit(10);
        store.write("k", "12345").unwrap();

        let err = store.write("k2", "123456789").unwrap_err();
        assert!(matches!(err, StoreError::CapacityExceeded { limit: 10, .. }));
        assert_eq!(store.read("k2").unwrap(), None);

        // Overwriting an existing key only counts the difference.
        store.write("k", "123456789").unwrap();
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let path = temp_path();
        {
            let store = FileStore::open(&path, None);
            store.write("moodmap_cache_v1_x", "{\"a\":1}").unwrap();
            store.write("other", "y").unwrap();
            store.delete("other").unwrap();
        }

        let reopened = FileStore::open(&path, None);
        assert_eq!(
            reopened.read("moodmap_cache_v1_x").unwrap().as_deref(),
            Some("{\"a\":1}")
        );
        assert_eq!(reopened.read("other").unwrap(), None);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_file_store_corrupt_file_starts_empty() {
        let path = temp_path();
        create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json at all").unwrap();

        let store = FileStore::open(&path, None);
        assert!(store.list_keys_with_prefix("").unwrap().is_empty());

        store.write("a", "b").unwrap();
        assert_eq!(FileStore::open(&path, None).read("a").unwrap().as_deref(), Some("b"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_file_store_capacity_limit() {
        let path = temp_path();
        let store = FileStore::open(&path, Some(4));

        assert!(matches!(
            store.write("key", "value"),
            Err(StoreError::CapacityExceeded { .. })
        ));
        assert_eq!(store.read("key").unwrap(), None);
        assert!(!path.exists());
    }
}
