//! API Handlers
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use mockup_core::MockupError;
use mockup_sync::{CommandOutcome, FormSource};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

type ApiResponse = (StatusCode, Json<Value>);

#[derive(Debug, Deserialize)]
pub struct FieldUpdate {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub command: String,
}

#[derive(Debug, Deserialize)]
pub struct QuickActionRequest {
    pub action: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

fn ok<T: Serialize>(value: &T) -> ApiResponse {
    match serde_json::to_value(value) {
        Ok(body) => (StatusCode::OK, Json(body)),
        Err(e) => internal(e),
    }
}

fn not_found(what: &str) -> ApiResponse {
    let error = MockupError::NotFound(what.to_string());
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": error.to_string() })),
    )
}

fn internal(e: impl std::fmt::Display) -> ApiResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
    )
}

pub async fn health() -> ApiResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") })),
    )
}

pub async fn get_mockup(State(state): State<AppState>) -> ApiResponse {
    match state.coordinator.store().get_current_mockup() {
        Some(mockup) => ok(&mockup),
        None => not_found("mockup"),
    }
}

pub async fn export_mockup(State(state): State<AppState>) -> ApiResponse {
    match state.coordinator.store().export_mockup() {
        Some(export) => ok(&export),
        None => not_found("mockup"),
    }
}

pub async fn mockup_stats(State(state): State<AppState>) -> ApiResponse {
    match state.coordinator.store().get_mockup_stats() {
        Some(stats) => ok(&stats),
        None => not_found("mockup"),
    }
}

pub async fn mockup_differences(State(state): State<AppState>) -> ApiResponse {
    ok(&state.coordinator.differences())
}

pub async fn session_view(State(state): State<AppState>) -> ApiResponse {
    ok(&state.coordinator.view())
}

pub async fn get_form(State(state): State<AppState>) -> ApiResponse {
    ok(&state.form.watch())
}

pub async fn update_field(
    State(state): State<AppState>,
    Path(field): Path<String>,
    Json(update): Json<FieldUpdate>,
) -> ApiResponse {
    state.form.set_value(&field, &update.value);
    let scheduled = state.coordinator.on_form_change();
    (
        StatusCode::OK,
        Json(json!({ "field": field, "value": update.value, "syncScheduled": scheduled })),
    )
}

fn command_response(state: &AppState, outcome: CommandOutcome) -> ApiResponse {
    let status = match &outcome {
        CommandOutcome::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CommandOutcome::Replied { suggestions, .. } => {
            state.metrics.proposals.inc_by(suggestions.len() as u64);
            StatusCode::OK
        }
        CommandOutcome::Failed { .. } => StatusCode::BAD_GATEWAY,
        CommandOutcome::Discarded => StatusCode::CONFLICT,
    };
    match serde_json::to_value(&outcome) {
        Ok(body) => (status, Json(body)),
        Err(e) => internal(e),
    }
}

pub async fn process_command(
    State(state): State<AppState>,
    Json(request): Json<CommandRequest>,
) -> ApiResponse {
    let outcome = state.coordinator.process_command(&request.command).await;
    command_response(&state, outcome)
}

pub async fn quick_action(
    State(state): State<AppState>,
    Json(request): Json<QuickActionRequest>,
) -> ApiResponse {
    match state.coordinator.quick_action(&request.action).await {
        Some(outcome) => command_response(&state, outcome),
        None => not_found("quick action"),
    }
}

pub async fn analyze_form(State(state): State<AppState>) -> ApiResponse {
    let outcome = state.coordinator.analyze_form().await;
    command_response(&state, outcome)
}

pub async fn pending_suggestions(State(state): State<AppState>) -> ApiResponse {
    ok(&state.coordinator.pending_suggestions())
}

pub async fn approve_suggestion(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse {
    match state.coordinator.approve(&id) {
        Some(mockup) => {
            state.metrics.approvals.inc();
            ok(&mockup)
        }
        None => not_found("pending suggestion"),
    }
}

pub async fn reject_suggestion(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RejectRequest>,
) -> ApiResponse {
    match state.coordinator.reject(&id, request.reason.as_deref()) {
        Some(mockup) => {
            state.metrics.rejections.inc();
            ok(&mockup)
        }
        None => not_found("pending suggestion"),
    }
}

pub async fn reset_mockup(State(state): State<AppState>) -> ApiResponse {
    match state.coordinator.reset() {
        Ok(mockup) => ok(&mockup),
        Err(e) => internal(e),
    }
}

pub async fn submit_mockup(State(state): State<AppState>) -> ApiResponse {
    match state.coordinator.submit() {
        Ok(Some(export)) => ok(&export),
        Ok(None) => not_found("mockup"),
        Err(e) => internal(e),
    }
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    state
        .metrics
        .form_syncs
        .set(state.coordinator.syncs_committed() as i64);
    match state.metrics.encode() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => internal(e).into_response(),
    }
}
