//! Suggestion producer contract
//!
//! A producer turns a chat command plus the current field map into an
//! [`AssistantReply`]. Commands are validated before `propose` is called.

use crate::error::ProducerError;
use crate::validation::{validate_command, ValidationOutcome};
use async_trait::async_trait;
use mockup_core::{FieldMap, Proposal};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Suggestions,
    Validation,
    GeneralHelp,
}

/// Problem found while reviewing a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormIssue {
    pub field: String,
    pub severity: IssueSeverity,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Error,
    Improvement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantReply {
    pub kind: ReplyKind,
    pub message: String,
    #[serde(default)]
    pub proposals: Vec<Proposal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<FormIssue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quick_actions: Vec<String>,
    /// Review score (0-100), for validation replies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<u32>,
    /// Producer that answered
    pub source: String,
}

impl AssistantReply {
    pub fn suggestions(
        source: impl Into<String>,
        message: impl Into<String>,
        proposals: Vec<Proposal>,
    ) -> Self {
        Self {
            kind: ReplyKind::Suggestions,
            message: message.into(),
            proposals,
            issues: Vec::new(),
            quick_actions: Vec::new(),
            overall_score: None,
            source: source.into(),
        }
    }

    pub fn with_issues(mut self, issues: Vec<FormIssue>) -> Self {
        self.kind = ReplyKind::Validation;
        self.issues = issues;
        self
    }

    pub fn with_score(mut self, score: u32) -> Self {
        self.overall_score = Some(score);
        self
    }

    pub fn with_quick_actions(mut self, actions: Vec<String>) -> Self {
        self.kind = ReplyKind::GeneralHelp;
        self.quick_actions = actions;
        self
    }

    pub fn has_proposals(&self) -> bool {
        !self.proposals.is_empty()
    }
}

#[async_trait]
pub trait SuggestionProducer: Send + Sync {
    /// Short identifier stamped on proposals (e.g. "local")
    fn name(&self) -> &str;

    /// Screen a raw command before it reaches `propose`.
    fn validate(&self, command: &str) -> ValidationOutcome {
        validate_command(command)
    }

    async fn propose(
        &self,
        command: &str,
        fields: &FieldMap,
    ) -> Result<AssistantReply, ProducerError>;
}

