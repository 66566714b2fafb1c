//! Data Model: Mockup, Change, Suggestion
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Field name to value map, shared by the live form and the mockup.
///
/// Ordered so that a serialized record is byte-stable across round-trips.
pub type FieldMap = BTreeMap<String, String>;

/// Fresh collision-resistant identifier for changes and suggestions.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// The persisted shadow copy of the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mockup {
    /// Creation instant (Unix ms), never changes
    pub id: i64,
    /// Creation timestamp
    pub timestamp: DateTime<Utc>,
    pub data: FieldMap,
    /// Append-only change log
    pub pending_changes: Vec<Change>,
    pub ai_suggestions: Vec<Suggestion>,
    pub version: u64,
    pub last_updated: DateTime<Utc>,
}

impl Mockup {
    pub fn new(fields: FieldMap, now: DateTime<Utc>) -> Self {
        Self {
            id: now.timestamp_millis(),
            timestamp: now,
            data: fields,
            pending_changes: Vec::new(),
            ai_suggestions: Vec::new(),
            version: 1,
            last_updated: now,
        }
    }

    /// Current value of a field, empty when the field is absent.
    pub fn value(&self, field: &str) -> &str {
        self.data.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn suggestion(&self, id: &str) -> Option<&Suggestion> {
        self.ai_suggestions.iter().find(|s| s.id == id)
    }

    pub fn suggestion_mut(&mut self, id: &str) -> Option<&mut Suggestion> {
        self.ai_suggestions.iter_mut().find(|s| s.id == id)
    }

    /// Pending suggestions in proposal order.
    pub fn pending_suggestions(&self) -> Vec<Suggestion> {
        self.ai_suggestions
            .iter()
            .filter(|s| s.is_pending())
            .cloned()
            .collect()
    }

    pub fn count_with_status(&self, status: SuggestionStatus) -> usize {
        self.ai_suggestions
            .iter()
            .filter(|s| s.status == status)
            .count()
    }

    /// Number of fields holding a non-empty value.
    pub fn fields_completed(&self) -> usize {
        self.data.values().filter(|v| !v.is_empty()).count()
    }

    /// Set a field and append the matching change record.
    pub(crate) fn record_change(
        &mut self,
        field: &str,
        new_value: String,
        source: ChangeSource,
        applied: bool,
        now: DateTime<Utc>,
    ) -> &mut Change {
        let old_value = self.value(field).to_string();
        self.data.insert(field.to_string(), new_value.clone());
        self.pending_changes.push(Change {
            id: new_id(),
            field: field.to_string(),
            old_value,
            new_value,
            source,
            timestamp: now,
            applied,
            suggestion_id: None,
        });
        let last = self.pending_changes.len() - 1;
        &mut self.pending_changes[last]
    }
}

/// Origin of a field mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeSource {
    /// Direct edit by the user
    User,
    /// Value written by an approved suggestion
    AiApproved,
    /// Absorbed from the live form by a sync
    FormSync,
}

impl std::fmt::Display for ChangeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ChangeSource::User => write!(f, "user"),
            ChangeSource::AiApproved => write!(f, "ai_approved"),
            ChangeSource::FormSync => write!(f, "form_sync"),
        }
    }
}

/// Immutable log entry for one field mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub id: String,
    pub field: String,
    pub old_value: String,
    pub new_value: String,
    pub source: ChangeSource,
    pub timestamp: DateTime<Utc>,
    pub applied: bool,
    /// Suggestion that produced this change, for `ai_approved` entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion_id: Option<String>,
}

/// Lifecycle state of a suggestion.
///
/// `Pending` moves to exactly one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SuggestionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SuggestionStatus::Pending)
    }

    pub fn can_transition_to(self, to: SuggestionStatus) -> bool {
        matches!(
            (self, to),
            (SuggestionStatus::Pending, SuggestionStatus::Approved)
                | (SuggestionStatus::Pending, SuggestionStatus::Rejected)
        )
    }
}

/// An assistant-proposed value awaiting a human decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: String,
    pub field: String,
    /// Field value when the proposal was received
    pub current_value: String,
    pub suggested_value: String,
    /// 0-100
    pub confidence: u8,
    pub reason: String,
    pub status: SuggestionStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    /// Producer that emitted the proposal (e.g. "local", "assistant")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Suggestion {
    pub fn from_proposal(proposal: Proposal, snapshot: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            current_value: proposal
                .current_value
                .unwrap_or_else(|| snapshot.to_string()),
            field: proposal.field,
            suggested_value: proposal.suggested_value,
            confidence: proposal.confidence.min(100),
            reason: proposal.reason,
            status: SuggestionStatus::Pending,
            timestamp: now,
            applied_at: None,
            rejected_at: None,
            rejection_reason: None,
            source: proposal.source,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == SuggestionStatus::Pending
    }

    /// Move to `Approved`. Returns false when already decided.
    pub fn approve(&mut self, now: DateTime<Utc>) -> bool {
        if !self.status.can_transition_to(SuggestionStatus::Approved) {
            return false;
        }
        self.status = SuggestionStatus::Approved;
        self.applied_at = Some(now);
        true
    }

    /// Move to `Rejected`. Returns false when already decided.
    pub fn reject(&mut self, reason: impl Into<String>, now: DateTime<Utc>) -> bool {
        if !self.status.can_transition_to(SuggestionStatus::Rejected) {
            return false;
        }
        self.status = SuggestionStatus::Rejected;
        self.rejected_at = Some(now);
        self.rejection_reason = Some(reason.into());
        true
    }
}

/// Raw producer output, before it becomes a [`Suggestion`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub field: String,
    pub suggested_value: String,
    pub confidence: u8,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Proposal {
    pub fn new(field: impl Into<String>, suggested_value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            suggested_value: suggested_value.into(),
            confidence: 50,
            reason: String::new(),
            current_value: None,
            source: None,
        }
    }

    pub fn with_confidence(mut self, confidence: u8) -> Self {
        self.confidence = confidence.min(100);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_current_value(mut self, value: impl Into<String>) -> Self {
        self.current_value = Some(value.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// A field whose mockup value differs from a reference map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDifference {
    pub field: String,
    pub original_value: String,
    pub mockup_value: String,
}

/// Read-only projection handed to submitters and analysers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockupExport {
    pub data: FieldMap,
    pub metadata: ExportMetadata,
    pub history: ExportHistory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub version: u64,
    pub timestamp: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub change_count: usize,
    pub approved_count: usize,
    pub completion_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportHistory {
    pub changes: Vec<Change>,
    pub suggestions: Vec<Suggestion>,
}

/// Aggregate counters for status panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockupStats {
    pub version: u64,
    pub completion_score: u32,
    pub total_changes: usize,
    /// Total suggestions ever received
    pub ai_interactions: usize,
    pub pending_suggestions: usize,
    pub approved_suggestions: usize,
    pub rejected_suggestions: usize,
    pub last_updated: DateTime<Utc>,
    pub fields_completed: usize,
}
