//! Key-value blob store contract and backends.
//!
//! The mockup record is persisted as one JSON blob under a fixed key. Any
//! backend works as long as `set` replaces a blob atomically.
use crate::error::StorageError;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Durable blob store holding at most one record per key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, blob: &str) -> Result<(), StorageError>;

    /// Deleting a missing key succeeds.
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local store; contents are lost with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned(key: &str) -> StorageError {
        StorageError::Unavailable(format!("memory store lock poisoned ({key})"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().map_err(|_| Self::poisoned(key))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned(key))?;
        entries.insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned(key))?;
        entries.remove(key);
        Ok(())
    }
}

/// One file per key inside a directory.
///
/// Writes land in a sibling temp file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) the backing directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        let target = self.path_for(key);
        let tmp = target.with_extension("json.tmp");
        let io_err = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };

        let mut file = fs::File::create(&tmp).map_err(io_err)?;
        file.write_all(blob.as_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        fs::rename(&tmp, &target).map_err(io_err)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "{\"a\":1}").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("{\"a\":1}"));

        store.delete("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        // deleting twice is fine
        store.delete("k").unwrap();
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::open(dir.path()).unwrap();
            store.set("sandbox_form_mockup", "{}").unwrap();
        }

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get("sandbox_form_mockup").unwrap().as_deref(),
            Some("{}")
        );
    }

    #[test]
    fn test_file_store_overwrite_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("k", "first").unwrap();
        store.set("k", "second").unwrap();

        assert_eq!(store.get("k").unwrap().as_deref(), Some("second"));
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_file_store_delete_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.delete("never_written").unwrap();
        assert_eq!(store.get("never_written").unwrap(), None);
    }

    #[test]
    fn test_file_store_sanitizes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("../escape", "x").unwrap();
        assert!(dir.path().join("___escape.json").exists());
    }
}
