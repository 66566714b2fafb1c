//! Sync Coordinator: glue between the live form, the mockup and the assistant
//!
//! One coordinator per session. Form changes are debounced into
//! `sync_with_form`; assistant proposals become pending suggestions; approvals
//! are pushed back into the live form.

use crate::debounce::{lock, Debouncer};
use crate::form::FormSource;
use crate::message::ChatMessage;
use mockup_assist::{
    quick_action_command, AssistantReply, LocalAnalyzer, SuggestionProducer, ValidationOutcome,
    ValidationReason, VALIDATE_FORM_COMMAND,
};
use mockup_core::{
    mockup_differences, FieldDifference, FieldMap, Mockup, MockupExport, MockupStats,
    MockupStore, Proposal, Suggestion, SyncConfig,
};
use mockup_core::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Source tag on confirmations of approve/reject decisions
pub const DECISION_SOURCE: &str = "coordinator";

/// Result of sending a command to the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// Refused before reaching a producer
    Rejected(ValidationOutcome),
    Replied {
        reply: AssistantReply,
        /// Suggestions created from the reply's proposals
        suggestions: Vec<Suggestion>,
        /// Answered by local analysis after the producer failed
        fallback: bool,
    },
    Failed { message: String },
    /// The session was reset or submitted while the producer was running
    Discarded,
}

/// Snapshot of everything a UI renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatorView {
    pub mockup: Option<Mockup>,
    pub pending_suggestions: Vec<Suggestion>,
    pub stats: Option<MockupStats>,
    pub messages: Vec<ChatMessage>,
}

/// Value pushed into the form by the last approval
#[derive(Debug, Clone)]
struct ApprovalEcho {
    field: String,
    value: String,
}

pub struct SyncCoordinator {
    store: Arc<MockupStore>,
    form: Arc<dyn FormSource>,
    producer: Arc<dyn SuggestionProducer>,
    fallback: LocalAnalyzer,
    debouncer: Debouncer<FieldMap>,
    suppress_echo: bool,
    /// Bumped by reset and submit; producer results from older generations are dropped
    generation: AtomicU64,
    echo: Mutex<Option<ApprovalEcho>>,
    messages: Mutex<Vec<ChatMessage>>,
    syncs: Arc<AtomicU64>,
}

impl SyncCoordinator {
    pub fn new(
        store: Arc<MockupStore>,
        form: Arc<dyn FormSource>,
        producer: Arc<dyn SuggestionProducer>,
    ) -> Self {
        let syncs = Arc::new(AtomicU64::new(0));
        let debouncer = Debouncer::new(
            DEFAULT_DEBOUNCE,
            sync_action(Arc::clone(&store), Arc::clone(&syncs)),
        );
        Self {
            store,
            form,
            producer,
            fallback: LocalAnalyzer::new(),
            debouncer,
            suppress_echo: true,
            generation: AtomicU64::new(0),
            echo: Mutex::new(None),
            messages: Mutex::new(Vec::new()),
            syncs,
        }
    }

    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debouncer = self.debouncer.with_delay(delay);
        self
    }

    pub fn with_echo_suppression(mut self, suppress: bool) -> Self {
        self.suppress_echo = suppress;
        self
    }

    pub fn with_sync_config(self, config: &SyncConfig) -> Self {
        self.with_debounce(Duration::from_millis(config.debounce_ms))
            .with_echo_suppression(config.suppress_approval_echo)
    }

    pub fn store(&self) -> &Arc<MockupStore> {
        &self.store
    }

    pub fn form(&self) -> &Arc<dyn FormSource> {
        &self.form
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Debounced syncs committed so far
    pub fn syncs_committed(&self) -> u64 {
        self.syncs.load(Ordering::Relaxed)
    }

    /// Resume the stored mockup or create one from the form, then absorb drift.
    pub fn mount(&self) -> Result<Mockup> {
        let live = self.form.watch();
        let mockup = match self.store.get_current_mockup() {
            Some(mockup) => {
                info!(version = mockup.version, "resumed mockup");
                mockup
            }
            None => {
                let mockup = self.store.create_mockup(live.clone())?;
                info!(fields = mockup.data.len(), "created mockup");
                mockup
            }
        };
        Ok(self.store.sync_with_form(&live).unwrap_or(mockup))
    }

    /// Live form changed. Returns whether a sync was scheduled.
    pub fn on_form_change(&self) -> bool {
        let snapshot = self.form.watch();
        if self.suppress_echo && self.is_approval_echo(&snapshot) {
            debug!("approval echo suppressed");
            return false;
        }
        self.debouncer.schedule(snapshot);
        true
    }

    fn is_approval_echo(&self, snapshot: &FieldMap) -> bool {
        let Some(echo) = lock(&self.echo).take() else {
            return false;
        };
        if snapshot.get(&echo.field) != Some(&echo.value) {
            return false;
        }
        self.store
            .get_current_mockup()
            .map(|mockup| mockup_differences(&mockup, snapshot).is_empty())
            .unwrap_or(false)
    }

    /// Commit a pending debounced sync now.
    pub fn flush(&self) -> bool {
        self.debouncer.flush()
    }

    pub fn has_pending_sync(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Validate a chat command and run it through the producer.
    pub async fn process_command(&self, command: &str) -> CommandOutcome {
        let command = command.trim();
        if command.is_empty() {
            return CommandOutcome::Rejected(ValidationOutcome::invalid(
                ValidationReason::ContentTooShort,
                "Digite um comando para o assistente.",
            ));
        }

        let outcome = self.producer.validate(command);
        if !outcome.is_valid {
            info!(reason = ?outcome.reason, "command refused");
            return CommandOutcome::Rejected(outcome);
        }

        self.push_message(ChatMessage::user(command));
        self.run(command).await
    }

    /// Expand a quick action label. `None` for unknown labels.
    pub async fn quick_action(&self, label: &str) -> Option<CommandOutcome> {
        let command = quick_action_command(label)?;
        Some(self.process_command(command).await)
    }

    /// Full-form review through the producer.
    pub async fn analyze_form(&self) -> CommandOutcome {
        self.push_message(ChatMessage::user(VALIDATE_FORM_COMMAND));
        self.run(VALIDATE_FORM_COMMAND).await
    }

    /// Inject proposals from an external source.
    pub fn receive_proposals(&self, proposals: Vec<Proposal>) -> Vec<Suggestion> {
        self.accept_proposals(proposals)
    }

    async fn run(&self, command: &str) -> CommandOutcome {
        let generation = self.generation();
        let fields = self.current_fields();

        let result = match self.producer.propose(command, &fields).await {
            Ok(reply) => Ok((reply, false)),
            Err(e) => {
                warn!(producer = self.producer.name(), error = %e, "producer failed, falling back to local analysis");
                self.fallback
                    .propose(command, &fields)
                    .await
                    .map(|reply| (reply, true))
            }
        };

        if self.generation() != generation {
            debug!(generation, "discarding producer result from a previous session");
            return CommandOutcome::Discarded;
        }

        let (reply, fallback) = match result {
            Ok(answer) => answer,
            Err(e) => {
                error!(error = %e, "local analysis failed");
                let message = format!("Não foi possível processar o comando: {e}");
                self.push_message(ChatMessage::assistant(&message, self.fallback.name()));
                return CommandOutcome::Failed { message };
            }
        };

        let suggestions = self.accept_proposals(reply.proposals.clone());
        let ids = suggestions.iter().map(|s| s.id.clone()).collect();
        self.push_message(ChatMessage::assistant(&reply.message, &reply.source).with_suggestions(ids));

        CommandOutcome::Replied {
            reply,
            suggestions,
            fallback,
        }
    }

    fn accept_proposals(&self, proposals: Vec<Proposal>) -> Vec<Suggestion> {
        let count = proposals.len();
        if count == 0 {
            return Vec::new();
        }
        match self.store.add_ai_suggestions(proposals) {
            Some(mockup) => {
                let mut all = mockup.ai_suggestions;
                let start = all.len().saturating_sub(count);
                debug!(count, "proposals received");
                all.split_off(start)
            }
            None => {
                warn!(count, "proposals dropped, no mockup");
                Vec::new()
            }
        }
    }

    fn current_fields(&self) -> FieldMap {
        self.store
            .get_current_mockup()
            .map(|mockup| mockup.data)
            .unwrap_or_else(|| self.form.watch())
    }

    /// Approve a suggestion and push its value into the live form.
    pub fn approve(&self, id: &str) -> Option<Mockup> {
        // Pending keystrokes land before the approved value
        self.debouncer.flush();

        let mockup = self.store.approve_suggestion(id)?;
        let suggestion = mockup.suggestion(id)?;
        let (field, value) = (suggestion.field.clone(), suggestion.suggested_value.clone());

        self.form.set_value(&field, &value);
        if self.suppress_echo {
            *lock(&self.echo) = Some(ApprovalEcho {
                field: field.clone(),
                value,
            });
        }
        info!(suggestion_id = id, field = %field, version = mockup.version, "suggestion applied to form");
        self.push_message(
            ChatMessage::assistant(
                format!(
                    "Perfeito! Apliquei a sugestão no campo \"{field}\". A mudança já está visível no seu formulário."
                ),
                DECISION_SOURCE,
            )
            .with_suggestions(vec![id.to_string()]),
        );
        Some(mockup)
    }

    pub fn reject(&self, id: &str, reason: Option<&str>) -> Option<Mockup> {
        let mockup = self.store.reject_suggestion(id, reason.unwrap_or(""))?;
        info!(suggestion_id = id, "suggestion rejected");
        let content = match reason.map(str::trim).filter(|r| !r.is_empty()) {
            Some(reason) => format!(
                "Entendi! Rejeitei a sugestão. Motivo: {reason}. Posso ajudar de outra forma?"
            ),
            None => "Entendi! Rejeitei a sugestão. Posso ajudar de outra forma?".to_string(),
        };
        self.push_message(
            ChatMessage::assistant(content, DECISION_SOURCE).with_suggestions(vec![id.to_string()]),
        );
        Some(mockup)
    }

    /// Drop the mockup and start over from the live form.
    pub fn reset(&self) -> Result<Mockup> {
        self.end_session();
        self.store.clear_mockup()?;
        let mockup = self.store.create_mockup(self.form.watch())?;
        info!(generation = self.generation(), "mockup reset");
        Ok(mockup)
    }

    /// Commit pending edits, export, then clear the mockup.
    pub fn submit(&self) -> Result<Option<MockupExport>> {
        self.debouncer.flush();
        let export = self.store.export_mockup();
        self.end_session();
        self.store.clear_mockup()?;
        info!(
            version = ?export.as_ref().map(|e| e.metadata.version),
            "mockup submitted"
        );
        Ok(export)
    }

    fn end_session(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.debouncer.cancel();
        lock(&self.echo).take();
        lock(&self.messages).clear();
    }

    /// Fields where the live form and the mockup disagree
    pub fn differences(&self) -> Vec<FieldDifference> {
        self.store.get_mockup_differences(&self.form.watch())
    }

    pub fn pending_suggestions(&self) -> Vec<Suggestion> {
        self.store.get_pending_suggestions()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        lock(&self.messages).clone()
    }

    fn push_message(&self, message: ChatMessage) {
        lock(&self.messages).push(message);
    }

    pub fn view(&self) -> CoordinatorView {
        let mockup = self.store.get_current_mockup();
        CoordinatorView {
            pending_suggestions: mockup
                .as_ref()
                .map(Mockup::pending_suggestions)
                .unwrap_or_default(),
            stats: mockup.as_ref().map(|m| self.store.stats_for(m)),
            mockup,
            messages: self.messages(),
        }
    }
}

impl std::fmt::Debug for SyncCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCoordinator")
            .field("producer", &self.producer.name())
            .field("debounce", &self.debouncer.delay())
            .field("suppress_echo", &self.suppress_echo)
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

fn sync_action(store: Arc<MockupStore>, syncs: Arc<AtomicU64>) -> impl Fn(FieldMap) + Send + Sync + 'static {
    move |fields| {
        syncs.fetch_add(1, Ordering::Relaxed);
        match store.sync_with_form(&fields) {
            Some(mockup) => debug!(version = mockup.version, "form sync committed"),
            None => warn!("form sync skipped"),
        }
    }
}
