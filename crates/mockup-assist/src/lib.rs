//! Mockup Assist: suggestion producers for form mockups
//!
//! - [`validation`] screens commands and field values
//! - [`command`] classifies commands and expands quick actions
//! - [`local`] answers offline with canned, field-aware proposals
//! - [`reply`] adapts a free-text assistant and parses its answers

pub mod command;
pub mod error;
pub mod local;
pub mod producer;
pub mod reply;
pub mod validation;

pub use command::{quick_action_command, quick_action_labels, CommandKind, VALIDATE_FORM_COMMAND};
pub use error::ProducerError;
pub use local::{review_score, LocalAnalyzer, LOCAL_SOURCE};
pub use producer::{AssistantReply, FormIssue, IssueSeverity, ReplyKind, SuggestionProducer};
pub use reply::{
    build_context, parse_reply, TextAssistant, TextAssistantProducer, ASSISTANT_SOURCE,
};
pub use validation::{
    validate_command, ContentValidator, FieldRule, ValidationOutcome, ValidationReason,
};
