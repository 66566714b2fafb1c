//! Command classification and quick actions

use serde::{Deserialize, Serialize};

/// What a chat command asks the assistant to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    ImproveIdea,
    FillField,
    ValidateForm,
    SuggestObjectives,
    TimelineHelp,
    General,
}

impl CommandKind {
    /// Keyword classification, first match wins.
    pub fn detect(command: &str) -> Self {
        let lower = command.to_lowercase();
        let has = |terms: &[&str]| terms.iter().any(|t| lower.contains(t));

        if has(&["melhor", "aprimorar"]) {
            CommandKind::ImproveIdea
        } else if has(&["preencher", "completar"]) {
            CommandKind::FillField
        } else if has(&["validar", "revisar"]) {
            CommandKind::ValidateForm
        } else if has(&["objetivo", "meta"]) {
            CommandKind::SuggestObjectives
        } else if has(&["cronograma", "prazo"]) {
            CommandKind::TimelineHelp
        } else {
            CommandKind::General
        }
    }
}

/// Canned command sent for a full-form review
pub const VALIDATE_FORM_COMMAND: &str = "validar formulário completo";

/// Quick action labels and the commands they expand to
pub const QUICK_ACTIONS: &[(&str, &str)] = &[
    ("Melhorar minha ideia", "melhorar e aprimorar minha ideia"),
    ("Preencher campos vazios", "preencher campos que estão vazios"),
    ("Validar formulário", "validar meu formulário completo"),
    ("Sugerir objetivos", "sugerir objetivos e métricas para minha ideia"),
    ("Criar cronograma", "criar cronograma detalhado para meu projeto"),
];

pub fn quick_action_command(label: &str) -> Option<&'static str> {
    QUICK_ACTIONS
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(_, command)| *command)
}

pub fn quick_action_labels() -> Vec<String> {
    QUICK_ACTIONS.iter().map(|(l, _)| l.to_string()).collect()
}
