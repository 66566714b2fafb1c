//! Integration tests for MockupStore against in-memory and file backends.
//!
//! These tests exercise the full read-modify-write cycle through the
//! key-value contract, including corrupt and unwritable stores.

use mockup_core::{
    field_map, ChangeSource, FieldMap, FileStore, KeyValueStore, MemoryStore, Mockup, MockupStore,
    Proposal, StorageError, SuggestionStatus, MOCKUP_KEY, PENDING_CHANGES_KEY,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Every field the default form renders, all empty
fn empty_form() -> FieldMap {
    field_map([
        ("ideaTitle", ""),
        ("ideaDescription", ""),
        ("problema", ""),
        ("publicoAlvo", ""),
        ("objetivos", ""),
        ("metricas", ""),
        ("cronograma", ""),
        ("recursos", ""),
        ("desafios", ""),
        ("faseDesejada", ""),
    ])
}

fn memory_store() -> (Arc<MemoryStore>, MockupStore) {
    let backend = Arc::new(MemoryStore::new());
    let store = MockupStore::new(backend.clone());
    (backend, store)
}

/// Backend whose writes can be switched off
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("reads disabled".into()));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("quota exceeded".into()));
        }
        self.inner.set(key, blob)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.inner.delete(key)
    }
}

// =============================================================================
// Creation and absence
// =============================================================================

#[test]
fn test_create_starts_at_version_one() {
    let (_, store) = memory_store();
    let mockup = store.create_mockup(empty_form()).unwrap();

    assert_eq!(mockup.version, 1);
    assert!(mockup.pending_changes.is_empty());
    assert!(mockup.ai_suggestions.is_empty());
    assert_eq!(store.get_current_mockup(), Some(mockup));
}

#[test]
fn test_operations_without_mockup_are_noops() {
    let (_, store) = memory_store();

    assert!(store.get_current_mockup().is_none());
    assert!(store.update_field("ideaTitle", "x", ChangeSource::User).is_none());
    assert!(store.add_ai_suggestions(vec![Proposal::new("problema", "p")]).is_none());
    assert!(store.approve_suggestion("missing").is_none());
    assert!(store.reject_suggestion("missing", "").is_none());
    assert!(store.export_mockup().is_none());
    assert!(store.get_mockup_stats().is_none());
    assert!(store.get_pending_suggestions().is_empty());
    assert!(store.get_mockup_differences(&empty_form()).is_empty());
}

#[test]
fn test_corrupt_record_reads_as_absent() {
    let (backend, store) = memory_store();
    backend.set(MOCKUP_KEY, "{not json").unwrap();

    assert!(store.get_current_mockup().is_none());

    // self-heals through a fresh create
    let mockup = store.create_mockup(empty_form()).unwrap();
    assert_eq!(store.get_current_mockup(), Some(mockup));
}

#[test]
fn test_unwritable_store_fails_create() {
    let backend = Arc::new(FlakyStore::default());
    backend.fail_writes.store(true, Ordering::SeqCst);
    let store = MockupStore::new(backend.clone());

    let err = store.create_mockup(empty_form()).unwrap_err();
    assert!(err.to_string().starts_with("PERSIST/"));
    assert!(store.get_current_mockup().is_none());
}

#[test]
fn test_failed_write_leaves_record_untouched() {
    let backend = Arc::new(FlakyStore::default());
    let store = MockupStore::new(backend.clone());
    store.create_mockup(empty_form()).unwrap();

    backend.fail_writes.store(true, Ordering::SeqCst);
    assert!(store.update_field("ideaTitle", "novo", ChangeSource::User).is_none());

    backend.fail_writes.store(false, Ordering::SeqCst);
    let mockup = store.get_current_mockup().unwrap();
    assert_eq!(mockup.version, 1);
    assert_eq!(mockup.value("ideaTitle"), "");
}

#[test]
fn test_unreadable_store_reads_as_absent() {
    let backend = Arc::new(FlakyStore::default());
    let store = MockupStore::new(backend.clone());
    store.create_mockup(empty_form()).unwrap();

    backend.fail_reads.store(true, Ordering::SeqCst);
    assert!(store.get_current_mockup().is_none());
    assert!(store.sync_with_form(&empty_form()).is_none());
}

// =============================================================================
// Field updates and form sync
// =============================================================================

#[test]
fn test_update_field_logs_old_value() {
    let (_, store) = memory_store();
    store.create_mockup(field_map([("ideaTitle", "antigo")])).unwrap();

    let mockup = store.update_field("ideaTitle", "novo", ChangeSource::User).unwrap();
    assert_eq!(mockup.version, 2);
    let change = &mockup.pending_changes[0];
    assert_eq!(change.old_value, "antigo");
    assert_eq!(change.new_value, "novo");
    assert_eq!(change.source, ChangeSource::User);
    assert!(change.applied);

    // absent field logs an empty old value
    let mockup = store.update_field("desafios", "prazo", ChangeSource::FormSync).unwrap();
    let change = mockup.pending_changes.last().unwrap();
    assert_eq!(change.old_value, "");
    assert!(!change.applied);
}

#[test]
fn test_update_field_with_same_value_is_noop() {
    let (backend, store) = memory_store();
    store.create_mockup(field_map([("ideaTitle", "mesmo")])).unwrap();
    let before = backend.get(MOCKUP_KEY).unwrap();

    let mockup = store.update_field("ideaTitle", "mesmo", ChangeSource::User).unwrap();
    assert_eq!(mockup.version, 1);
    assert!(mockup.pending_changes.is_empty());
    assert_eq!(backend.get(MOCKUP_KEY).unwrap(), before);
}

#[test]
fn test_sync_bumps_version_once_per_batch() {
    let (_, store) = memory_store();
    store.create_mockup(empty_form()).unwrap();

    let mut form = empty_form();
    form.insert("ideaTitle".into(), "Atendimento inteligente".into());
    form.insert("problema".into(), "Filas longas".into());
    form.insert("metricas".into(), "NPS".into());

    let mockup = store.sync_with_form(&form).unwrap();
    assert_eq!(mockup.version, 2);
    assert_eq!(mockup.pending_changes.len(), 3);
    assert!(mockup
        .pending_changes
        .iter()
        .all(|c| c.source == ChangeSource::FormSync && c.applied));
}

#[test]
fn test_noop_sync_keeps_version() {
    let (_, store) = memory_store();
    let created = store.create_mockup(empty_form()).unwrap();

    let mockup = store.sync_with_form(&empty_form()).unwrap();
    assert_eq!(mockup.version, 1);
    assert!(mockup.pending_changes.is_empty());
    assert_eq!(mockup.last_updated, created.last_updated);
}

#[test]
fn test_sync_ignores_absent_fields() {
    let (_, store) = memory_store();
    store
        .create_mockup(field_map([("ideaTitle", "titulo"), ("problema", "p")]))
        .unwrap();

    let mockup = store.sync_with_form(&field_map([("problema", "p2")])).unwrap();
    assert_eq!(mockup.value("ideaTitle"), "titulo");
    assert_eq!(mockup.value("problema"), "p2");
    assert_eq!(mockup.pending_changes.len(), 1);
}

#[test]
fn test_sync_without_mockup_creates_one() {
    let (_, store) = memory_store();
    let form = field_map([("ideaTitle", "Nova ideia")]);

    let mockup = store.sync_with_form(&form).unwrap();
    assert_eq!(mockup.version, 1);
    assert_eq!(mockup.data, form);
    assert!(mockup.pending_changes.is_empty());
}

#[test]
fn test_version_counts_only_effective_mutations() {
    let (_, store) = memory_store();
    store.create_mockup(empty_form()).unwrap();

    let mut form = empty_form();
    let mut effective = 0;
    for (i, title) in ["a", "a", "ab", "ab", "abc"].iter().enumerate() {
        form.insert("ideaTitle".into(), title.to_string());
        let before = store.get_current_mockup().unwrap();
        store.sync_with_form(&form);
        if before.value("ideaTitle") != *title {
            effective += 1;
        }
        if i == 2 {
            store.update_field("recursos", "equipe", ChangeSource::User);
            effective += 1;
        }
        if i == 3 {
            store.update_field("recursos", "equipe", ChangeSource::User);
        }
    }

    assert_eq!(store.get_current_mockup().unwrap().version, 1 + effective);
}

// =============================================================================
// Suggestions
// =============================================================================

#[test]
fn test_add_suggestions_keeps_version_and_order() {
    let (_, store) = memory_store();
    store.create_mockup(field_map([("problema", "atual")])).unwrap();

    let mockup = store
        .add_ai_suggestions(vec![
            Proposal::new("problema", "p1").with_confidence(88),
            Proposal::new("publicoAlvo", "p2").with_confidence(92),
        ])
        .unwrap();

    assert_eq!(mockup.version, 1);
    assert_eq!(mockup.ai_suggestions.len(), 2);
    assert_eq!(mockup.ai_suggestions[0].suggested_value, "p1");
    assert_eq!(mockup.ai_suggestions[0].current_value, "atual");
    assert_eq!(mockup.ai_suggestions[1].current_value, "");
    assert_ne!(mockup.ai_suggestions[0].id, mockup.ai_suggestions[1].id);
    assert!(mockup.ai_suggestions.iter().all(|s| s.is_pending()));
}

#[test]
fn test_approve_is_idempotent() {
    let (_, store) = memory_store();
    store.create_mockup(empty_form()).unwrap();
    let id = store
        .add_ai_suggestions(vec![Proposal::new("objetivos", "Reduzir filas em 50%")])
        .unwrap()
        .ai_suggestions[0]
        .id
        .clone();

    let first = store.approve_suggestion(&id).unwrap();
    assert_eq!(first.version, 2);
    assert_eq!(first.value("objetivos"), "Reduzir filas em 50%");
    let change = first.pending_changes.last().unwrap();
    assert_eq!(change.source, ChangeSource::AiApproved);
    assert_eq!(change.suggestion_id.as_deref(), Some(id.as_str()));
    assert!(first.suggestion(&id).unwrap().applied_at.is_some());

    assert!(store.approve_suggestion(&id).is_none());
    let after = store.get_current_mockup().unwrap();
    assert_eq!(after.version, 2);
    assert_eq!(after.pending_changes.len(), first.pending_changes.len());
}

#[test]
fn test_approve_records_value_before_write() {
    let (_, store) = memory_store();
    store.create_mockup(field_map([("metricas", "inicial")])).unwrap();
    let id = store
        .add_ai_suggestions(vec![Proposal::new("metricas", "KPIs")])
        .unwrap()
        .ai_suggestions[0]
        .id
        .clone();

    // edit lands between proposal and approval
    store.update_field("metricas", "editado", ChangeSource::User);
    let mockup = store.approve_suggestion(&id).unwrap();

    let change = mockup.pending_changes.last().unwrap();
    assert_eq!(change.old_value, "editado");
    assert_eq!(mockup.suggestion(&id).unwrap().current_value, "inicial");
}

#[test]
fn test_reject_leaves_data_alone() {
    let (_, store) = memory_store();
    store.create_mockup(empty_form()).unwrap();
    let id = store
        .add_ai_suggestions(vec![Proposal::new("cronograma", "Fase 1")])
        .unwrap()
        .ai_suggestions[0]
        .id
        .clone();
    let before = store.get_current_mockup().unwrap();

    let mockup = store.reject_suggestion(&id, "fora do escopo").unwrap();
    assert_eq!(mockup.data, before.data);
    assert_eq!(mockup.pending_changes, before.pending_changes);
    assert_eq!(mockup.version, before.version);

    let suggestion = mockup.suggestion(&id).unwrap();
    assert_eq!(suggestion.status, SuggestionStatus::Rejected);
    assert_eq!(suggestion.rejection_reason.as_deref(), Some("fora do escopo"));
    assert!(suggestion.rejected_at.is_some());
}

#[test]
fn test_decided_suggestions_are_terminal() {
    let (_, store) = memory_store();
    store.create_mockup(empty_form()).unwrap();
    let mockup = store
        .add_ai_suggestions(vec![Proposal::new("recursos", "r"), Proposal::new("desafios", "d")])
        .unwrap();
    let approved = mockup.ai_suggestions[0].id.clone();
    let rejected = mockup.ai_suggestions[1].id.clone();

    store.approve_suggestion(&approved).unwrap();
    store.reject_suggestion(&rejected, "").unwrap();

    assert!(store.reject_suggestion(&approved, "too late").is_none());
    assert!(store.approve_suggestion(&rejected).is_none());

    let mockup = store.get_current_mockup().unwrap();
    assert_eq!(mockup.suggestion(&approved).unwrap().status, SuggestionStatus::Approved);
    assert_eq!(mockup.suggestion(&rejected).unwrap().status, SuggestionStatus::Rejected);
    assert_eq!(mockup.value("desafios"), "");
}

#[test]
fn test_pending_filter_preserves_order() {
    let (_, store) = memory_store();
    store.create_mockup(empty_form()).unwrap();
    let mockup = store
        .add_ai_suggestions(vec![
            Proposal::new("a", "1"),
            Proposal::new("b", "2"),
            Proposal::new("c", "3"),
        ])
        .unwrap();
    store.approve_suggestion(&mockup.ai_suggestions[1].id).unwrap();

    let pending: Vec<_> = store
        .get_pending_suggestions()
        .into_iter()
        .map(|s| s.field)
        .collect();
    assert_eq!(pending, vec!["a".to_string(), "c".to_string()]);
}

// =============================================================================
// Differences, export, stats
// =============================================================================

#[test]
fn test_differences_match_sync_effect() {
    let (_, store) = memory_store();
    store.create_mockup(empty_form()).unwrap();

    assert!(store.get_mockup_differences(&empty_form()).is_empty());

    let mut form = empty_form();
    form.insert("publicoAlvo".into(), "Aposentados".into());
    let diffs = store.get_mockup_differences(&form);
    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].field, "publicoAlvo");
    assert_eq!(diffs[0].original_value, "Aposentados");
    assert_eq!(diffs[0].mockup_value, "");

    // reading did not mutate
    assert_eq!(store.get_current_mockup().unwrap().version, 1);

    store.sync_with_form(&form).unwrap();
    assert!(store.get_mockup_differences(&form).is_empty());
}

#[test]
fn test_differences_report_new_form_keys() {
    let (_, store) = memory_store();
    store.create_mockup(field_map([("ideaTitle", "t")])).unwrap();

    let diffs = store.get_mockup_differences(&field_map([("ideaTitle", "t"), ("extra", "novo")]));
    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].field, "extra");
}

#[test]
fn test_export_projection() {
    let (_, store) = memory_store();
    store.create_mockup(empty_form()).unwrap();
    store.update_field("ideaTitle", "Atendimento 24h", ChangeSource::User);
    let id = store
        .add_ai_suggestions(vec![Proposal::new("objetivos", "Meta")])
        .unwrap()
        .ai_suggestions[0]
        .id
        .clone();
    store.approve_suggestion(&id).unwrap();

    let mockup = store.get_current_mockup().unwrap();
    let export = store.export_mockup().unwrap();
    assert_eq!(export.data, mockup.data);
    assert_eq!(export.metadata.version, 3);
    assert_eq!(export.metadata.change_count, 2);
    assert_eq!(export.metadata.approved_count, 1);
    assert_eq!(export.metadata.completion_score, store.calculate_completion_score(&mockup.data));
    assert_eq!(export.history.changes, mockup.pending_changes);
    assert_eq!(export.history.suggestions, mockup.ai_suggestions);

    let json = serde_json::to_value(&export).unwrap();
    assert!(json["metadata"]["changeCount"].is_number());
}

#[test]
fn test_scenario_score_and_approval() {
    let (_, store) = memory_store();
    store.create_mockup(empty_form()).unwrap();
    assert_eq!(store.get_mockup_stats().unwrap().completion_score, 0);

    store.update_field("ideaTitle", "Onze chars!", ChangeSource::User);
    let stats = store.get_mockup_stats().unwrap();
    // 10 / 70 * 100
    assert_eq!(stats.completion_score, 14);

    let before = store.get_current_mockup().unwrap();
    let mockup = store
        .add_ai_suggestions(vec![Proposal::new("objetivos", "Reduzir custos")])
        .unwrap();
    let id = mockup.ai_suggestions[0].id.clone();
    let pending_before = store.get_mockup_stats().unwrap().pending_suggestions;

    let mockup = store.approve_suggestion(&id).unwrap();
    let stats = store.get_mockup_stats().unwrap();
    assert_eq!(mockup.value("objetivos"), "Reduzir custos");
    assert_eq!(stats.pending_suggestions, pending_before - 1);
    assert_eq!(stats.approved_suggestions, 1);
    assert_eq!(stats.version, before.version + 1);
}

#[test]
fn test_stats_counts() {
    let (_, store) = memory_store();
    store
        .create_mockup(field_map([("ideaTitle", "x"), ("problema", ""), ("metricas", "y")]))
        .unwrap();
    let mockup = store
        .add_ai_suggestions(vec![
            Proposal::new("problema", "1"),
            Proposal::new("problema", "2"),
            Proposal::new("problema", "3"),
        ])
        .unwrap();
    store.approve_suggestion(&mockup.ai_suggestions[0].id).unwrap();
    store.reject_suggestion(&mockup.ai_suggestions[1].id, "").unwrap();

    let stats = store.get_mockup_stats().unwrap();
    assert_eq!(stats.ai_interactions, 3);
    assert_eq!(stats.pending_suggestions, 1);
    assert_eq!(stats.approved_suggestions, 1);
    assert_eq!(stats.rejected_suggestions, 1);
    assert_eq!(stats.total_changes, 1);
    assert_eq!(stats.fields_completed, 3);
}

#[test]
fn test_clear_removes_both_keys() {
    let (backend, store) = memory_store();
    store.create_mockup(empty_form()).unwrap();
    backend.set(PENDING_CHANGES_KEY, "[]").unwrap();

    store.clear_mockup().unwrap();
    assert!(store.get_current_mockup().is_none());
    assert_eq!(backend.get(PENDING_CHANGES_KEY).unwrap(), None);
}

// =============================================================================
// Persistence round-trip
// =============================================================================

#[test]
fn test_record_roundtrips_byte_for_byte() {
    let (backend, store) = memory_store();
    store.create_mockup(empty_form()).unwrap();
    store.update_field("ideaTitle", "Título com acentuação", ChangeSource::User);
    let id = store
        .add_ai_suggestions(vec![Proposal::new("problema", "Demora").with_reason("Específico")])
        .unwrap()
        .ai_suggestions[0]
        .id
        .clone();
    store.reject_suggestion(&id, "não").unwrap();

    let blob = backend.get(MOCKUP_KEY).unwrap().unwrap();
    let decoded: Mockup = serde_json::from_str(&blob).unwrap();
    assert_eq!(serde_json::to_string(&decoded).unwrap(), blob);
    assert_eq!(Some(decoded), store.get_current_mockup());
}

#[test]
fn test_file_backend_resumes_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let created = {
        let store = MockupStore::new(Arc::new(FileStore::open(dir.path()).unwrap()));
        store.create_mockup(empty_form()).unwrap();
        store.update_field("faseDesejada", "Discovery", ChangeSource::User).unwrap()
    };

    let store = MockupStore::new(Arc::new(FileStore::open(dir.path()).unwrap()));
    let resumed = store.get_current_mockup().unwrap();
    assert_eq!(resumed, created);
    assert_eq!(resumed.version, 2);
}
