//! MockupStore: sole authority over the persisted mockup record
//!
//! Every mutation is a read-modify-write of the whole record against the
//! key-value store. Operations on a missing mockup return `None`; storage
//! and decoding failures are logged and also surface as `None`, except for
//! `create_mockup`, which reports them.
use crate::error::Result;
use crate::model::{
    ChangeSource, ExportHistory, ExportMetadata, FieldDifference, FieldMap, Mockup, MockupExport,
    MockupStats, Proposal, Suggestion, SuggestionStatus,
};
use crate::score::CompletionSchema;
use crate::storage::KeyValueStore;
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, warn};

/// Key of the mockup record
pub const MOCKUP_KEY: &str = "sandbox_form_mockup";
/// Reserved; only ever cleared
pub const PENDING_CHANGES_KEY: &str = "sandbox_pending_changes";

pub struct MockupStore {
    store: Arc<dyn KeyValueStore>,
    schema: CompletionSchema,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl MockupStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_schema(store, CompletionSchema::default())
    }

    pub fn with_schema(store: Arc<dyn KeyValueStore>, schema: CompletionSchema) -> Self {
        Self {
            store,
            schema,
            write_lock: Mutex::new(()),
        }
    }

    pub fn schema(&self) -> &CompletionSchema {
        &self.schema
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load(&self) -> Result<Option<Mockup>> {
        let Some(blob) = self.store.get(MOCKUP_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<Mockup>(&blob) {
            Ok(mockup) => Ok(Some(mockup)),
            Err(e) => {
                warn!(error = %e, blob_len = blob.len(), "discarding corrupt mockup record");
                Ok(None)
            }
        }
    }

    fn save(&self, mockup: &mut Mockup) -> Result<()> {
        mockup.last_updated = Utc::now();
        let blob = serde_json::to_string(mockup)?;
        self.store.set(MOCKUP_KEY, &blob)?;
        Ok(())
    }

    /// Load, apply `f`, persist.
    ///
    /// `f` returns `None` to abort, `Some(false)` to hand back the record
    /// unchanged without writing, `Some(true)` to persist it.
    fn mutate<F>(&self, op: &'static str, f: F) -> Option<Mockup>
    where
        F: FnOnce(&mut Mockup) -> Option<bool>,
    {
        let _guard = self.lock();
        let result = (|| -> Result<Option<Mockup>> {
            let Some(mut mockup) = self.load()? else {
                return Ok(None);
            };
            match f(&mut mockup) {
                None => return Ok(None),
                Some(false) => return Ok(Some(mockup)),
                Some(true) => {}
            }
            self.save(&mut mockup)?;
            Ok(Some(mockup))
        })();

        match result {
            Ok(mockup) => mockup,
            Err(e) => {
                error!(op, error = %e, "mockup operation failed");
                None
            }
        }
    }

    fn create_locked(&self, fields: FieldMap) -> Result<Mockup> {
        let mut mockup = Mockup::new(fields, Utc::now());
        self.save(&mut mockup)?;
        debug!(id = mockup.id, fields = mockup.data.len(), "mockup created");
        Ok(mockup)
    }

    /// Start a fresh mockup at version 1, replacing any existing record.
    pub fn create_mockup(&self, fields: FieldMap) -> Result<Mockup> {
        let _guard = self.lock();
        self.create_locked(fields)
    }

    /// The persisted mockup, or `None` if absent, unreadable or corrupt.
    pub fn get_current_mockup(&self) -> Option<Mockup> {
        match self.load() {
            Ok(mockup) => mockup,
            Err(e) => {
                error!(error = %e, "failed to read mockup");
                None
            }
        }
    }

    pub fn update_field(
        &self,
        field: &str,
        value: impl Into<String>,
        source: ChangeSource,
    ) -> Option<Mockup> {
        let value = value.into();
        self.mutate("update_field", |mockup| {
            if mockup.value(field) == value {
                debug!(field, "field unchanged");
                return Some(false);
            }
            let applied = source == ChangeSource::User;
            mockup.record_change(field, value, source, applied, Utc::now());
            mockup.version += 1;
            debug!(field, %source, version = mockup.version, "field updated");
            Some(true)
        })
    }

    /// Append proposals as pending suggestions. Leaves `version` alone.
    pub fn add_ai_suggestions(&self, proposals: Vec<Proposal>) -> Option<Mockup> {
        self.mutate("add_ai_suggestions", |mockup| {
            let now = Utc::now();
            let count = proposals.len();
            for proposal in proposals {
                let snapshot = mockup.value(&proposal.field).to_string();
                mockup
                    .ai_suggestions
                    .push(Suggestion::from_proposal(proposal, &snapshot, now));
            }
            debug!(count, total = mockup.ai_suggestions.len(), "suggestions added");
            Some(true)
        })
    }

    /// Apply a pending suggestion. `None` if unknown or already decided.
    pub fn approve_suggestion(&self, id: &str) -> Option<Mockup> {
        self.mutate("approve_suggestion", |mockup| {
            let now = Utc::now();
            let suggestion = mockup.suggestion_mut(id)?;
            if !suggestion.approve(now) {
                debug!(suggestion_id = id, status = ?suggestion.status, "suggestion already decided");
                return None;
            }
            let field = suggestion.field.clone();
            let value = suggestion.suggested_value.clone();

            let change = mockup.record_change(&field, value, ChangeSource::AiApproved, true, now);
            change.suggestion_id = Some(id.to_string());
            mockup.version += 1;
            debug!(suggestion_id = id, field = %field, version = mockup.version, "suggestion approved");
            Some(true)
        })
    }

    /// Mark a pending suggestion rejected. Data, log and version untouched.
    pub fn reject_suggestion(&self, id: &str, reason: &str) -> Option<Mockup> {
        self.mutate("reject_suggestion", |mockup| {
            let suggestion = mockup.suggestion_mut(id)?;
            if !suggestion.reject(reason, Utc::now()) {
                debug!(suggestion_id = id, status = ?suggestion.status, "suggestion already decided");
                return None;
            }
            debug!(suggestion_id = id, "suggestion rejected");
            Some(true)
        })
    }

    /// Absorb live form values. One version bump per batch with changes.
    pub fn sync_with_form(&self, live: &FieldMap) -> Option<Mockup> {
        let _guard = self.lock();
        let result = (|| -> Result<Mockup> {
            let Some(mut mockup) = self.load()? else {
                return self.create_locked(live.clone());
            };

            let now = Utc::now();
            let mut changed = 0usize;
            for (field, value) in live {
                if mockup.value(field) != value.as_str() {
                    mockup.record_change(field, value.clone(), ChangeSource::FormSync, true, now);
                    changed += 1;
                }
            }

            if changed > 0 {
                mockup.version += 1;
                self.save(&mut mockup)?;
                debug!(changed, version = mockup.version, "form synced");
            }
            Ok(mockup)
        })();

        match result {
            Ok(mockup) => Some(mockup),
            Err(e) => {
                error!(error = %e, "form sync failed");
                None
            }
        }
    }

    /// Fields where the mockup and `reference` disagree.
    ///
    /// Covers every mockup key (missing reference values count as empty)
    /// plus reference keys the mockup lacks that carry a non-empty value.
    pub fn get_mockup_differences(&self, reference: &FieldMap) -> Vec<FieldDifference> {
        let Some(mockup) = self.get_current_mockup() else {
            return Vec::new();
        };
        mockup_differences(&mockup, reference)
    }

    pub fn get_pending_suggestions(&self) -> Vec<Suggestion> {
        self.get_current_mockup()
            .map(|m| m.pending_suggestions())
            .unwrap_or_default()
    }

    pub fn calculate_completion_score(&self, fields: &FieldMap) -> u32 {
        self.schema.score(fields)
    }

    pub fn export_mockup(&self) -> Option<MockupExport> {
        let mockup = self.get_current_mockup()?;
        Some(MockupExport {
            metadata: ExportMetadata {
                version: mockup.version,
                timestamp: mockup.timestamp,
                last_updated: mockup.last_updated,
                change_count: mockup.pending_changes.len(),
                approved_count: mockup.count_with_status(SuggestionStatus::Approved),
                completion_score: self.schema.score(&mockup.data),
            },
            data: mockup.data,
            history: ExportHistory {
                changes: mockup.pending_changes,
                suggestions: mockup.ai_suggestions,
            },
        })
    }

    pub fn get_mockup_stats(&self) -> Option<MockupStats> {
        let mockup = self.get_current_mockup()?;
        Some(self.stats_for(&mockup))
    }

    /// Stats for an already loaded record.
    pub fn stats_for(&self, mockup: &Mockup) -> MockupStats {
        MockupStats {
            version: mockup.version,
            completion_score: self.schema.score(&mockup.data),
            total_changes: mockup.pending_changes.len(),
            ai_interactions: mockup.ai_suggestions.len(),
            pending_suggestions: mockup.count_with_status(SuggestionStatus::Pending),
            approved_suggestions: mockup.count_with_status(SuggestionStatus::Approved),
            rejected_suggestions: mockup.count_with_status(SuggestionStatus::Rejected),
            last_updated: mockup.last_updated,
            fields_completed: mockup.fields_completed(),
        }
    }

    /// Remove the record (and the reserved key).
    pub fn clear_mockup(&self) -> Result<()> {
        let _guard = self.lock();
        self.store.delete(MOCKUP_KEY)?;
        self.store.delete(PENDING_CHANGES_KEY)?;
        debug!("mockup cleared");
        Ok(())
    }
}

/// Pure diff between a loaded mockup and a reference map.
pub fn mockup_differences(mockup: &Mockup, reference: &FieldMap) -> Vec<FieldDifference> {
    let missing_from_mockup = reference
        .iter()
        .filter(|(field, value)| !mockup.data.contains_key(*field) && !value.is_empty())
        .map(|(field, value)| FieldDifference {
            field: field.clone(),
            original_value: value.clone(),
            mockup_value: String::new(),
        });

    mockup
        .data
        .iter()
        .filter_map(|(field, mockup_value)| {
            let original = reference.get(field).map(String::as_str).unwrap_or("");
            (original != mockup_value.as_str()).then(|| FieldDifference {
                field: field.clone(),
                original_value: original.to_string(),
                mockup_value: mockup_value.clone(),
            })
        })
        .chain(missing_from_mockup)
        .collect()
}

impl std::fmt::Debug for MockupStore {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("MockupStore")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}
