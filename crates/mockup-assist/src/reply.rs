//! Free-text assistant replies
//!
//! A [`TextAssistant`] answers a prompt with plain text. [`TextAssistantProducer`]
//! builds the prompt from the command and form context, then extracts field
//! proposals from the answer: lines that recommend something and name a field
//! become structured proposals; when none do, the emptiest field gets a single
//! contextual proposal.

use crate::error::ProducerError;
use crate::producer::{AssistantReply, SuggestionProducer};
use async_trait::async_trait;
use mockup_core::{FieldMap, Proposal};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tracing::{debug, warn};

pub const ASSISTANT_SOURCE: &str = "assistant";

const STRUCTURED_CONFIDENCE: u8 = 85;
const CONTEXTUAL_CONFIDENCE: u8 = 80;

/// Label mentioned in a reply line and the field it refers to, checked in order
const FIELD_LABELS: &[(&str, &str)] = &[
    ("título", "ideaTitle"),
    ("descrição", "ideaDescription"),
    ("problema", "problema"),
    ("público", "publicoAlvo"),
    ("objetivos", "objetivos"),
    ("métricas", "metricas"),
    ("cronograma", "cronograma"),
    ("recursos", "recursos"),
    ("desafios", "desafios"),
];

/// Fields considered for the contextual fallback, in priority order
const CONTEXT_FIELDS: &[&str] = &[
    "ideaTitle",
    "ideaDescription",
    "problema",
    "publicoAlvo",
    "objetivos",
    "metricas",
];

const SHORT_FIELD_LEN: usize = 30;

static RECOMMENDATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(sugerir|melhorar|recomendar)\b").unwrap()
});

fn value<'a>(fields: &'a FieldMap, field: &str) -> &'a str {
    fields.get(field).map(String::as_str).unwrap_or("")
}

/// Field and suggested text from one `label: text` line.
pub fn parse_line(line: &str) -> Option<(&'static str, String)> {
    let (_, rest) = line.split_once(':')?;
    if !RECOMMENDATION.is_match(line) {
        return None;
    }
    let suggested = rest.trim();
    if suggested.is_empty() {
        return None;
    }
    let lower = line.to_lowercase();
    FIELD_LABELS
        .iter()
        .find(|(label, _)| lower.contains(label))
        .map(|(_, field)| (*field, suggested.to_string()))
}

/// First context field that is empty, else the first one shorter than 30 chars.
pub fn most_empty_field(fields: &FieldMap) -> Option<&'static str> {
    CONTEXT_FIELDS
        .iter()
        .find(|f| value(fields, f).is_empty())
        .or_else(|| {
            CONTEXT_FIELDS
                .iter()
                .find(|f| value(fields, f).chars().count() < SHORT_FIELD_LEN)
        })
        .copied()
}

fn default_suggestion(field: &str) -> &'static str {
    match field {
        "ideaTitle" => "Título aprimorado com foco em valor e impacto",
        "ideaDescription" => "Descrição detalhada explicando a solução, benefícios e diferenciação",
        "problema" => "Problema específico identificado com dados quantitativos",
        "publicoAlvo" => "Segmento de clientes bem definido com características específicas",
        "objetivos" => "Objetivos SMART com metas mensuráveis e prazos definidos",
        "metricas" => "KPIs específicos para medir sucesso e ROI da solução",
        _ => "Campo necessita de mais informações detalhadas",
    }
}

/// First reply line between 21 and 199 chars, else the field default.
pub fn contextual_suggestion(field: &str, text: &str) -> String {
    text.lines()
        .find(|line| {
            let len = line.chars().count();
            len > 20 && len < 200
        })
        .map(|line| line.trim().to_string())
        .unwrap_or_else(|| default_suggestion(field).to_string())
}

/// Extract proposals from a free-text reply.
pub fn parse_reply(text: &str, fields: &FieldMap) -> Vec<Proposal> {
    let mut proposals: Vec<Proposal> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(parse_line)
        .map(|(field, suggested)| {
            Proposal::new(field, suggested)
                .with_current_value(value(fields, field))
                .with_reason("Sugestão do assistente")
                .with_confidence(STRUCTURED_CONFIDENCE)
                .with_source(ASSISTANT_SOURCE)
        })
        .collect();

    if proposals.is_empty() {
        if let Some(field) = most_empty_field(fields) {
            proposals.push(
                Proposal::new(field, contextual_suggestion(field, text))
                    .with_current_value(value(fields, field))
                    .with_reason("Baseado na análise do assistente")
                    .with_confidence(CONTEXTUAL_CONFIDENCE)
                    .with_source(ASSISTANT_SOURCE),
            );
        }
    }

    proposals
}

/// Prompt sent to the text assistant.
pub fn build_context(command: &str, fields: &FieldMap) -> String {
    let or_missing = |field: &str| {
        let v = value(fields, field);
        if v.is_empty() {
            "Não informado".to_string()
        } else {
            v.to_string()
        }
    };

    [
        "=== COMANDO DO USUÁRIO ===".to_string(),
        command.to_string(),
        String::new(),
        "=== CONTEXTO DO FORMULÁRIO ===".to_string(),
        format!("Título: {}", or_missing("ideaTitle")),
        format!("Descrição: {}", or_missing("ideaDescription")),
        format!("Problema: {}", or_missing("problema")),
        format!("Público-alvo: {}", or_missing("publicoAlvo")),
        format!("Objetivos: {}", or_missing("objetivos")),
        format!("Métricas: {}", or_missing("metricas")),
        String::new(),
        "=== INSTRUÇÃO ===".to_string(),
        "Com base no comando do usuário e no contexto do formulário, forneça sugestões específicas e acionáveis para melhorar a proposta.".to_string(),
        "Responda de forma estruturada e prática.".to_string(),
    ]
    .join("\n")
}

/// Remote assistant answering prompts with plain text
#[async_trait]
pub trait TextAssistant: Send + Sync {
    async fn send(&self, prompt: &str) -> Result<String, ProducerError>;
}

/// Adapts a [`TextAssistant`] to the producer contract.
pub struct TextAssistantProducer<T> {
    assistant: T,
    timeout: Option<Duration>,
}

impl<T: TextAssistant> TextAssistantProducer<T> {
    pub fn new(assistant: T) -> Self {
        Self {
            assistant,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn ask(&self, prompt: &str) -> Result<String, ProducerError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.assistant.send(prompt))
                .await
                .map_err(|_| ProducerError::Timeout(limit.as_millis() as u64))?,
            None => self.assistant.send(prompt).await,
        }
    }
}

#[async_trait]
impl<T: TextAssistant> SuggestionProducer for TextAssistantProducer<T> {
    fn name(&self) -> &str {
        ASSISTANT_SOURCE
    }

    async fn propose(
        &self,
        command: &str,
        fields: &FieldMap,
    ) -> Result<AssistantReply, ProducerError> {
        let prompt = build_context(command, fields);
        let text = self.ask(&prompt).await.map_err(|e| {
            warn!(error = %e, "assistant call failed");
            e
        })?;

        if text.trim().is_empty() {
            return Err(ProducerError::InvalidResponse("empty reply".into()));
        }

        let proposals = parse_reply(&text, fields);
        debug!(count = proposals.len(), "parsed assistant reply");

        Ok(AssistantReply::suggestions(
            ASSISTANT_SOURCE,
            format!("Análise do assistente:\n\n{text}"),
            proposals,
        ))
    }
}
