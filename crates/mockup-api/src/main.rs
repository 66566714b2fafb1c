//! Binary entrypoint for the Mockup API server.
use mockup_api::{blank_form, run, AppState, ADDR_ENV, DEFAULT_ADDR};
use mockup_assist::LocalAnalyzer;
use mockup_core::MockupConfig;
use mockup_sync::InMemoryForm;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = MockupConfig::from_env()?;
    let form = Arc::new(InMemoryForm::new(blank_form(&config.schema)));
    let state = AppState::new(&config, form, Arc::new(LocalAnalyzer::new()))?;

    let addr = std::env::var(ADDR_ENV).unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    run(&addr, state).await?;
    Ok(())
}
