//! Mockup Core: persisted form mockup, change log and suggestion lifecycle
//!
//! A mockup is a shadow copy of a multi-field form. Assistant proposals become
//! pending suggestions on it; a human approves or rejects each one, and every
//! field mutation lands in an append-only change log next to a monotonic
//! version counter.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mockup_core::{MemoryStore, MockupStore, FieldMap, Proposal};
//!
//! let store = MockupStore::new(Arc::new(MemoryStore::new()));
//! store.create_mockup(FieldMap::new()).unwrap();
//!
//! let mockup = store
//!     .add_ai_suggestions(vec![Proposal::new("objetivos", "Reduzir o tempo de espera")])
//!     .unwrap();
//! let id = mockup.ai_suggestions[0].id.clone();
//!
//! let approved = store.approve_suggestion(&id).unwrap();
//! assert_eq!(approved.value("objetivos"), "Reduzir o tempo de espera");
//! assert_eq!(approved.version, 2);
//! assert!(store.approve_suggestion(&id).is_none());
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod score;
pub mod storage;
pub mod store;

pub use config::{MockupConfig, StorageBackend, StorageConfig, SyncConfig};
pub use error::{MockupError, StorageError};
pub use model::{
    Change, ChangeSource, ExportHistory, ExportMetadata, FieldDifference, FieldMap, Mockup,
    MockupExport, MockupStats, Proposal, Suggestion, SuggestionStatus,
};
pub use score::{calculate_completion_score, CompletionSchema, TierPoints};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{mockup_differences, MockupStore, MOCKUP_KEY, PENDING_CHANGES_KEY};

/// Build a [`FieldMap`] from string pairs.
pub fn field_map<K, V, I>(pairs: I) -> FieldMap
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
