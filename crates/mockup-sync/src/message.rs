//! In-memory assistant conversation

use chrono::{DateTime, Utc};
use mockup_core::model::new_id;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Producer that answered, for assistant messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Suggestions created from this reply
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestion_ids: Vec<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            role: MessageRole::User,
            content: content.into(),
            timestamp: Utc::now(),
            source: None,
            suggestion_ids: Vec::new(),
        }
    }

    pub fn assistant(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            source: Some(source.into()),
            suggestion_ids: Vec::new(),
        }
    }

    pub fn with_suggestions(mut self, ids: Vec<String>) -> Self {
        self.suggestion_ids = ids;
        self
    }
}
