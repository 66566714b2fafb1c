//! Local analysis: offline producer used when the assistant is unavailable
//!
//! Routes on [`CommandKind`] and answers with canned, field-aware proposals.

use crate::command::{quick_action_labels, CommandKind};
use crate::error::ProducerError;
use crate::producer::{AssistantReply, FormIssue, IssueSeverity, SuggestionProducer};
use async_trait::async_trait;
use mockup_core::{FieldMap, Proposal};

pub const LOCAL_SOURCE: &str = "local";

const IMPROVED_DESCRIPTION_SUFFIX: &str = "\n\nEsta solução utilizará tecnologias avançadas de IA e machine learning para garantir maior eficiência e precisão nos resultados.";

const PROBLEM_TEMPLATE: &str = "O problema identificado é a demora no atendimento ao cliente, que pode levar até 30 minutos em horários de pico, causando insatisfação e perda de clientes.";

const AUDIENCE_TEMPLATE: &str =
    "Clientes pessoa física da CAIXA, com foco em aposentados e beneficiários do INSS";

const OBJECTIVES_TEMPLATE: &str = "Objetivo Principal: Reduzir em 50% o tempo médio de atendimento ao cliente através da implementação de IA conversacional.\n\nObjetivos Específicos:\n- Automatizar 80% das consultas mais frequentes\n- Melhorar a satisfação do cliente em 40%\n- Reduzir custos operacionais em 25%\n- Implementar solução em 180 dias";

const METRICS_TEMPLATE: &str = "Métricas de Sucesso:\n- Taxa de resolução automática: 80%\n- Tempo médio de resposta: <30 segundos\n- NPS (Net Promoter Score): +40 pontos\n- Redução de chamadas para atendentes: 60%\n- ROI esperado: 300% em 12 meses";

const TIMELINE_TEMPLATE: &str = "Cronograma Detalhado:\n\nFase 1 - Discovery (Meses 1-3):\n- Pesquisa e análise de requisitos\n- Prototipagem inicial\n- Validação com usuários\n\nFase 2 - Delivery (Meses 4-6):\n- Desenvolvimento do MVP\n- Testes com 1% da base\n- Ajustes baseados no feedback\n\nFase 3 - Scale (Meses 7-12):\n- Implementação nacional\n- Treinamento das equipes\n- Monitoramento e otimização";

const RESOURCES_TEMPLATE: &str = "Recursos Necessários:\n\nEquipe:\n- 1 Product Owner\n- 2 Desenvolvedores\n- 1 UX/UI Designer\n- 1 Especialista em IA\n\nTecnologia:\n- Plataforma de IA conversacional\n- APIs da CAIXA\n- Infraestrutura cloud\n\nOrçamento estimado: R$ 500.000";

/// Fields covered by the local review score
const REVIEW_FIELDS: &[&str] = &[
    "ideaTitle",
    "ideaDescription",
    "problema",
    "publicoAlvo",
    "objetivos",
    "metricas",
    "cronograma",
    "recursos",
];

fn value<'a>(fields: &'a FieldMap, field: &str) -> &'a str {
    fields.get(field).map(String::as_str).unwrap_or("")
}

fn char_len(fields: &FieldMap, field: &str) -> usize {
    value(fields, field).chars().count()
}

/// Offline producer; never fails.
#[derive(Debug, Clone, Default)]
pub struct LocalAnalyzer;

impl LocalAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn proposal(&self, fields: &FieldMap, field: &str, suggested: impl Into<String>) -> Proposal {
        Proposal::new(field, suggested)
            .with_current_value(value(fields, field))
            .with_source(LOCAL_SOURCE)
    }

    /// Reply for `command` against `fields`.
    pub fn analyze(&self, command: &str, fields: &FieldMap) -> AssistantReply {
        match CommandKind::detect(command) {
            CommandKind::ImproveIdea => self.improve_idea(fields),
            CommandKind::FillField => self.fill_fields(fields),
            CommandKind::ValidateForm => self.review_form(fields),
            CommandKind::SuggestObjectives => self.suggest_objectives(fields),
            CommandKind::TimelineHelp => self.suggest_timeline(fields),
            CommandKind::General => self.general_help(),
        }
    }

    fn improve_idea(&self, fields: &FieldMap) -> AssistantReply {
        let mut proposals = Vec::new();

        let title = value(fields, "ideaTitle");
        if !title.is_empty() {
            proposals.push(
                self.proposal(fields, "ideaTitle", format!("{title} - Versão Otimizada com IA"))
                    .with_reason("Título mais descritivo e impactante")
                    .with_confidence(85),
            );
        }

        let description = value(fields, "ideaDescription");
        if !description.is_empty() {
            proposals.push(
                self.proposal(
                    fields,
                    "ideaDescription",
                    format!("{description}{IMPROVED_DESCRIPTION_SUFFIX}"),
                )
                .with_reason("Adicionadas informações técnicas relevantes")
                .with_confidence(90),
            );
        }

        AssistantReply::suggestions(
            LOCAL_SOURCE,
            "Analisei sua ideia e tenho algumas sugestões de melhorias:",
            proposals,
        )
    }

    fn fill_fields(&self, fields: &FieldMap) -> AssistantReply {
        let mut proposals = Vec::new();

        if char_len(fields, "problema") < 30 {
            proposals.push(
                self.proposal(fields, "problema", PROBLEM_TEMPLATE)
                    .with_reason("Problema específico e mensurável")
                    .with_confidence(88),
            );
        }
        if char_len(fields, "publicoAlvo") < 10 {
            proposals.push(
                self.proposal(fields, "publicoAlvo", AUDIENCE_TEMPLATE)
                    .with_reason("Público-alvo bem definido e estratégico")
                    .with_confidence(92),
            );
        }

        AssistantReply::suggestions(
            LOCAL_SOURCE,
            "Identifiquei campos que podem ser melhorados. Quer que eu complete?",
            proposals,
        )
    }

    fn review_form(&self, fields: &FieldMap) -> AssistantReply {
        let mut issues = Vec::new();

        if char_len(fields, "ideaTitle") < 10 {
            issues.push(FormIssue {
                field: "ideaTitle".into(),
                severity: IssueSeverity::Error,
                message: "Título da ideia é obrigatório e deve ter pelo menos 10 caracteres".into(),
            });
        }
        if char_len(fields, "ideaDescription") < 50 {
            issues.push(FormIssue {
                field: "ideaDescription".into(),
                severity: IssueSeverity::Error,
                message: "Descrição da ideia deve ter pelo menos 50 caracteres".into(),
            });
        }
        let errors = issues.len();

        let objectives = char_len(fields, "objetivos");
        if objectives > 0 && objectives < 100 {
            issues.push(FormIssue {
                field: "objetivos".into(),
                severity: IssueSeverity::Improvement,
                message: "Objetivos podem ser mais detalhados para maior clareza".into(),
            });
        }

        let message = if errors > 0 {
            "Encontrei alguns problemas no formulário:"
        } else {
            "Formulário está bem estruturado!"
        };

        AssistantReply::suggestions(LOCAL_SOURCE, message, Vec::new())
            .with_issues(issues)
            .with_score(review_score(fields))
    }

    fn suggest_objectives(&self, fields: &FieldMap) -> AssistantReply {
        let mut proposals = Vec::new();

        if !value(fields, "ideaTitle").is_empty() && !value(fields, "ideaDescription").is_empty() {
            proposals.push(
                self.proposal(fields, "objetivos", OBJECTIVES_TEMPLATE)
                    .with_reason("Objetivos SMART (específicos, mensuráveis, atingíveis)")
                    .with_confidence(94),
            );
            proposals.push(
                self.proposal(fields, "metricas", METRICS_TEMPLATE)
                    .with_reason("Métricas quantificáveis e relevantes para o negócio")
                    .with_confidence(91),
            );
        }

        AssistantReply::suggestions(
            LOCAL_SOURCE,
            "Com base na sua ideia, sugiro os seguintes objetivos e métricas:",
            proposals,
        )
    }

    fn suggest_timeline(&self, fields: &FieldMap) -> AssistantReply {
        let proposals = vec![
            self.proposal(fields, "cronograma", TIMELINE_TEMPLATE)
                .with_reason("Cronograma realista seguindo metodologia do Sandbox")
                .with_confidence(96),
            self.proposal(fields, "recursos", RESOURCES_TEMPLATE)
                .with_reason("Recursos dimensionados para o escopo do projeto")
                .with_confidence(89),
        ];

        AssistantReply::suggestions(
            LOCAL_SOURCE,
            "Preparei um cronograma e lista de recursos para sua ideia:",
            proposals,
        )
    }

    fn general_help(&self) -> AssistantReply {
        AssistantReply::suggestions(
            LOCAL_SOURCE,
            "Estou aqui para ajudar! Posso:\n• Melhorar sua ideia\n• Preencher campos em branco\n• Validar o formulário\n• Sugerir objetivos\n• Criar cronograma\n\nO que você gostaria que eu fizesse?",
            Vec::new(),
        )
        .with_quick_actions(quick_action_labels())
    }
}

/// Review score used by form validation replies: 10/7/4 points per field
/// for more than 20, more than 10, or any characters.
pub fn review_score(fields: &FieldMap) -> u32 {
    let max = REVIEW_FIELDS.len() as u32 * 10;
    let score: u32 = REVIEW_FIELDS
        .iter()
        .map(|f| match char_len(fields, f) {
            n if n > 20 => 10,
            n if n > 10 => 7,
            n if n > 0 => 4,
            _ => 0,
        })
        .sum();
    (100.0 * score as f64 / max as f64).round() as u32
}

#[async_trait]
impl SuggestionProducer for LocalAnalyzer {
    fn name(&self) -> &str {
        LOCAL_SOURCE
    }

    async fn propose(
        &self,
        command: &str,
        fields: &FieldMap,
    ) -> Result<AssistantReply, ProducerError> {
        Ok(self.analyze(command, fields))
    }
}
