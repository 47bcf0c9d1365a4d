//! Durable key-value storage used by the preference store.
//!
//! The [`KeyValueStore`] trait is the seam between preferences and the
//! backing medium. Two backends ship with the crate:
//! - [`JsonFileStore`]: one JSON object per file, written atomically
//! - [`MemoryStore`]: in-process map, for tests and as a fallback when no
//!   config directory exists

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Storage failures. Both variants are recoverable by the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to read '{key}': {reason}")]
    Read { key: String, reason: String },

    #[error("Failed to write '{key}': {reason}")]
    Write { key: String, reason: String },
}

impl StorageError {
    pub fn read(key: &str, reason: impl ToString) -> Self {
        StorageError::Read {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn write(key: &str, reason: impl ToString) -> Self {
        StorageError::Write {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Asynchronous, fallible string key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process key-value store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed key-value store holding a single JSON object.
///
/// Writes go to a sibling temp file that is renamed over the target, so the
/// file is never observed half-written. A missing file reads as empty.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<Map<String, Value>, ReadFailure> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(ReadFailure::Io(e)),
        };

        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ReadFailure::Corrupt("storage file is not a JSON object".to_string())),
            Err(e) => Err(ReadFailure::Corrupt(e.to_string())),
        }
    }
}

/// Why the backing file could not be turned into a map.
#[derive(Debug, thiserror::Error)]
enum ReadFailure {
    /// The file exists but could not be read; its contents are unknown.
    #[error("{0}")]
    Io(#[source] std::io::Error),
    /// The file was read but does not hold a JSON object.
    #[error("corrupt storage file: {0}")]
    Corrupt(String),
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let map = self.read_map().await.map_err(|e| StorageError::read(key, e))?;
        Ok(map.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            // Non-string values surface verbatim so callers can reject them.
            other => other.to_string(),
        }))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;

        // Corrupt contents are replaced so one bad file cannot block saving.
        // A file we cannot read at all may still hold other keys; leave it be.
        let mut map = match self.read_map().await {
            Ok(map) => map,
            Err(ReadFailure::Corrupt(reason)) => {
                tracing::warn!("Replacing corrupt storage file {:?}: {}", self.path, reason);
                Map::new()
            }
            Err(ReadFailure::Io(e)) => {
                return Err(StorageError::write(
                    key,
                    format!("existing file unreadable: {}", e),
                ));
            }
        };
        map.insert(key.to_string(), Value::String(value.to_string()));

        let json =
            serde_json::to_string_pretty(&Value::Object(map)).map_err(|e| StorageError::write(key, e))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StorageError::write(key, e))?;
            }
        }

        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, json)
            .await
            .map_err(|e| StorageError::write(key, e))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StorageError::write(key, e))?;

        tracing::debug!("Stored '{}' in {:?}", key, self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a").await.unwrap(), None);
        store.set("a", "1").await.unwrap();
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));
        store.set("a", "2").await.unwrap();
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_memory_store_with_entries() {
        let store = MemoryStore::with_entries([("temperatureUnit", "fahrenheit")]);
        assert_eq!(
            store.get("temperatureUnit").await.unwrap().as_deref(),
            Some("fahrenheit")
        );
    }

    #[tokio::test]
    async fn test_file_store_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("prefs.json"));
        assert_eq!(store.get("temperatureUnit").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        let store = JsonFileStore::new(&path);
        store.set("temperatureUnit", "fahrenheit").await.unwrap();
        store.set("other", "value").await.unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(
            reopened.get("temperatureUnit").await.unwrap().as_deref(),
            Some("fahrenheit")
        );
        assert_eq!(reopened.get("other").await.unwrap().as_deref(), Some("value"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::new(&path);
        let err = store.get("temperatureUnit").await.unwrap_err();
        assert!(matches!(err, StorageError::Read { .. }));
    }

    #[tokio::test]
    async fn test_file_store_overwrites_corrupt_file_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let store = JsonFileStore::new(&path);
        store.set("temperatureUnit", "celsius").await.unwrap();
        assert_eq!(
            store.get("temperatureUnit").await.unwrap().as_deref(),
            Some("celsius")
        );
    }

    #[tokio::test]
    async fn test_file_store_non_string_value_is_returned_raw() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, r#"{"temperatureUnit": 42}"#).unwrap();

        let store = JsonFileStore::new(&path);
        assert_eq!(
            store.get("temperatureUnit").await.unwrap().as_deref(),
            Some("42")
        );
    }

    #[tokio::test]
    async fn test_file_store_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        // Parent "directory" is a regular file, so the target can't be reached.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let store = JsonFileStore::new(blocker.join("prefs.json"));
        let err = store.set("temperatureUnit", "celsius").await.unwrap_err();
        assert!(matches!(err, StorageError::Write { .. }));
    }

    #[tokio::test]
    async fn test_file_store_keeps_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the target path reads as an IO error, not corruption.
        let path = dir.path().join("prefs.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "other data").unwrap();

        let store = JsonFileStore::new(&path);
        let err = store.set("temperatureUnit", "celsius").await.unwrap_err();

        match err {
            StorageError::Write { key, reason } => {
                assert_eq!(key, "temperatureUnit");
                assert!(reason.contains("unreadable"), "{}", reason);
            }
            other => panic!("Expected Write, got {:?}", other),
        }
        assert!(path.join("keep").exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert!(matches!(
            store.get("temperatureUnit").await.unwrap_err(),
            StorageError::Read { .. }
        ));
    }
}
