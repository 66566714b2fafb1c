//! Configuration: storage backend, sync timing and scoring schema
//!
//! Loaded from YAML with every section optional, then adjusted from the
//! environment (`MOCKUP_STORE_DIR`, `MOCKUP_DEBOUNCE_MS`).
use crate::error::{MockupError, Result};
use crate::score::CompletionSchema;
use crate::storage::{FileStore, KeyValueStore, MemoryStore};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable pointing at a YAML config file
pub const CONFIG_PATH_ENV: &str = "MOCKUP_CONFIG";
pub const STORE_DIR_ENV: &str = "MOCKUP_STORE_DIR";
pub const DEBOUNCE_ENV: &str = "MOCKUP_DEBOUNCE_MS";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockupConfig {
    pub storage: StorageConfig,
    pub sync: SyncConfig,
    pub schema: CompletionSchema,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory for the file backend
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Quiescence window before a form change is synced
    pub debounce_ms: u64,
    /// Swallow the form change caused by pushing an approved value
    pub suppress_approval_echo: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            suppress_approval_echo: true,
        }
    }
}

impl MockupConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| MockupError::Config(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| MockupError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&raw)
    }

    /// File named by `MOCKUP_CONFIG` (or defaults), then env overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_path(path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `MOCKUP_*` overrides from an arbitrary lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(STORE_DIR_ENV) {
            self.storage.backend = StorageBackend::File;
            self.storage.dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = lookup(DEBOUNCE_ENV) {
            self.sync.debounce_ms = raw
                .trim()
                .parse()
                .map_err(|_| MockupError::Config(format!("{DEBOUNCE_ENV}={raw} is not a number")))?;
        }
        Ok(())
    }

    /// Build the configured backend.
    pub fn open_store(&self) -> Result<Arc<dyn KeyValueStore>> {
        match self.storage.backend {
            StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
            StorageBackend::File => {
                let dir = self.storage.dir.clone().ok_or_else(|| {
                    MockupError::Config("storage.dir is required for the file backend".into())
                })?;
                Ok(Arc::new(FileStore::open(dir)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = MockupConfig::default();
        assert_eq!(config.sync.debounce_ms, 500);
        assert!(config.sync.suppress_approval_echo);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.schema.max_points(), 70);
    }

    #[test]
    fn test_partial_yaml() {
        let config = MockupConfig::from_yaml(
            "sync:\n  debounce_ms: 250\nstorage:\n  backend: file\n  dir: /tmp/mockups\n",
        )
        .unwrap();
        assert_eq!(config.sync.debounce_ms, 250);
        assert!(config.sync.suppress_approval_echo);
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.dir, Some(PathBuf::from("/tmp/mockups")));
        assert_eq!(config.schema, CompletionSchema::default());
    }

    #[test]
    fn test_custom_schema_yaml() {
        let config = MockupConfig::from_yaml(
            "schema:\n  required: [title]\n  optional: []\n",
        )
        .unwrap();
        assert_eq!(config.schema.required, vec!["title".to_string()]);
        assert_eq!(config.schema.max_points(), 10);
    }

    #[test]
    fn test_invalid_yaml() {
        let err = MockupConfig::from_yaml("sync: [").unwrap_err();
        assert!(err.to_string().starts_with("CONFIG/"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> =
            [(STORE_DIR_ENV, "/var/lib/mockup"), (DEBOUNCE_ENV, "120")].into();
        let mut config = MockupConfig::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.dir, Some(PathBuf::from("/var/lib/mockup")));
        assert_eq!(config.sync.debounce_ms, 120);
    }

    #[test]
    fn test_bad_debounce_override() {
        let mut config = MockupConfig::default();
        let result = config.apply_overrides(|k| (k == DEBOUNCE_ENV).then(|| "soon".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_file_backend_requires_dir() {
        let mut config = MockupConfig::default();
        config.storage.backend = StorageBackend::File;
        assert!(config.open_store().is_err());

        let dir = tempfile::tempdir().unwrap();
        config.storage.dir = Some(dir.path().to_path_buf());
        assert!(config.open_store().is_ok());
    }
}
