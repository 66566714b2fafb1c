//! Mockup API /v1: REST endpoints over one form session
pub mod handlers;
pub mod metrics;
pub mod middleware;

use axum::{
    routing::{get, post, put},
    Router,
};
use metrics::ApiMetrics;
use mockup_assist::SuggestionProducer;
use mockup_core::{CompletionSchema, FieldMap, MockupConfig, MockupError, MockupStore};
use mockup_sync::{InMemoryForm, SyncCoordinator};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Listen address override
pub const ADDR_ENV: &str = "MOCKUP_ADDR";
pub const DEFAULT_ADDR: &str = "0.0.0.0:8788";

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<SyncCoordinator>,
    pub form: Arc<InMemoryForm>,
    pub metrics: Arc<ApiMetrics>,
}

impl AppState {
    /// Open the configured store and mount a session over `form`.
    pub fn new(
        config: &MockupConfig,
        form: Arc<InMemoryForm>,
        producer: Arc<dyn SuggestionProducer>,
    ) -> Result<Self, MockupError> {
        let store = Arc::new(MockupStore::with_schema(
            config.open_store()?,
            config.schema.clone(),
        ));
        let coordinator =
            SyncCoordinator::new(store, form.clone(), producer).with_sync_config(&config.sync);
        let mockup = coordinator.mount()?;
        tracing::info!(version = mockup.version, "session mounted");

        let metrics = ApiMetrics::new().map_err(|e| MockupError::Config(e.to_string()))?;

        Ok(Self {
            coordinator: Arc::new(coordinator),
            form,
            metrics: Arc::new(metrics),
        })
    }
}

/// Every field the schema scores, empty.
pub fn blank_form(schema: &CompletionSchema) -> FieldMap {
    schema
        .required
        .iter()
        .chain(&schema.optional)
        .map(|field| (field.clone(), String::new()))
        .collect()
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handlers::health))
        .route("/v1/session", get(handlers::session_view))
        .route("/v1/mockup", get(handlers::get_mockup))
        .route("/v1/mockup/export", get(handlers::export_mockup))
        .route("/v1/mockup/stats", get(handlers::mockup_stats))
        .route("/v1/mockup/differences", get(handlers::mockup_differences))
        .route("/v1/mockup/reset", post(handlers::reset_mockup))
        .route("/v1/mockup/submit", post(handlers::submit_mockup))
        .route("/v1/form", get(handlers::get_form))
        .route("/v1/form/fields/{field}", put(handlers::update_field))
        .route("/v1/assistant/commands", post(handlers::process_command))
        .route("/v1/assistant/quick-actions", post(handlers::quick_action))
        .route("/v1/assistant/analysis", post(handlers::analyze_form))
        .route("/v1/suggestions/pending", get(handlers::pending_suggestions))
        .route("/v1/suggestions/{id}/approve", post(handlers::approve_suggestion))
        .route("/v1/suggestions/{id}/reject", post(handlers::reject_suggestion))
        .route("/metrics", get(handlers::metrics))
        .layer(axum::middleware::from_fn(middleware::log_server_errors))
        .layer(middleware::cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(addr: &str, state: AppState) -> std::io::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Mockup API listening on {}", addr);
    axum::serve(listener, app).await
}
