//! Content validation for assistant commands and field values
//!
//! Screens prohibited terms first, then applies the optional per-field rule
//! (length bounds, required context terms).

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Terms that block a command outright
pub const PROHIBITED_TERMS: &[&str] = &[
    "hack",
    "illegal",
    "fraude",
    "roubo",
    "corrupção",
    "golpe",
    "esquema",
    "lavagem",
    "sonegação",
];

/// Why a piece of content was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationReason {
    ContentProhibited,
    ContentTooShort,
    ContentTooLong,
    MissingRequiredContext,
}

impl std::fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ValidationReason::ContentProhibited => write!(f, "content_prohibited"),
            ValidationReason::ContentTooShort => write!(f, "content_too_short"),
            ValidationReason::ContentTooLong => write!(f, "content_too_long"),
            ValidationReason::MissingRequiredContext => write!(f, "missing_required_context"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ValidationReason>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: "Conteúdo aprovado pela IA.".to_string(),
            reason: None,
        }
    }

    pub fn invalid(reason: ValidationReason, message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
            reason: Some(reason),
        }
    }
}

/// Constraints for one form field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    /// At least one of these must appear (case-insensitive)
    #[serde(default)]
    pub must_contain: Vec<String>,
}

impl FieldRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_length(mut self, min: usize, max: usize) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }

    pub fn must_contain(mut self, terms: &[&str]) -> Self {
        self.must_contain = terms.iter().map(|t| t.to_string()).collect();
        self
    }
}

static DEFAULT_RULES: Lazy<HashMap<&'static str, FieldRule>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("ideaTitle", FieldRule::new().with_length(10, 100));
    m.insert("ideaDescription", FieldRule::new().with_length(50, 1000));
    m.insert(
        "problema",
        FieldRule::new()
            .with_length(30, 500)
            .must_contain(&["problema", "dificuldade", "desafio", "necessidade"]),
    );
    m.insert(
        "objetivos",
        FieldRule::new()
            .with_length(40, 800)
            .must_contain(&["objetivo", "meta", "resultado", "melhorar"]),
    );
    m
});

/// Prohibited-term screen plus field rules.
#[derive(Debug, Clone)]
pub struct ContentValidator {
    prohibited: Vec<String>,
    rules: HashMap<String, FieldRule>,
}

impl Default for ContentValidator {
    fn default() -> Self {
        Self {
            prohibited: PROHIBITED_TERMS.iter().map(|t| t.to_string()).collect(),
            rules: DEFAULT_RULES
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }
}

impl ContentValidator {
    pub fn with_rule(mut self, field: impl Into<String>, rule: FieldRule) -> Self {
        self.rules.insert(field.into(), rule);
        self
    }

    /// Validate `content`, applying the rule for `field` when given.
    pub fn validate(&self, content: &str, field: Option<&str>) -> ValidationOutcome {
        let lower = content.to_lowercase();

        if self.prohibited.iter().any(|t| lower.contains(t.as_str())) {
            return ValidationOutcome::invalid(
                ValidationReason::ContentProhibited,
                "O conteúdo contém termos não permitidos pelas diretrizes do Sandbox CAIXA.",
            );
        }

        let Some(rule) = field.and_then(|f| self.rules.get(f)) else {
            return ValidationOutcome::valid();
        };

        let len = content.chars().count();
        if let Some(min) = rule.min_length {
            if len < min {
                return ValidationOutcome::invalid(
                    ValidationReason::ContentTooShort,
                    format!("O conteúdo deve ter pelo menos {min} caracteres."),
                );
            }
        }
        if let Some(max) = rule.max_length {
            if len > max {
                return ValidationOutcome::invalid(
                    ValidationReason::ContentTooLong,
                    format!("O conteúdo deve ter no máximo {max} caracteres."),
                );
            }
        }
        if !rule.must_contain.is_empty()
            && !rule
                .must_contain
                .iter()
                .any(|t| lower.contains(&t.to_lowercase()))
        {
            return ValidationOutcome::invalid(
                ValidationReason::MissingRequiredContext,
                format!("O conteúdo deve mencionar: {}.", rule.must_contain.join(", ")),
            );
        }

        ValidationOutcome::valid()
    }
}

/// Validate a raw command with the default validator.
pub fn validate_command(command: &str) -> ValidationOutcome {
    ContentValidator::default().validate(command, None)
}
