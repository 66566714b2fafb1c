//! Prometheus counters for suggestion decisions and form syncs.
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

pub struct ApiMetrics {
    registry: Registry,
    pub approvals: IntCounter,
    pub rejections: IntCounter,
    pub proposals: IntCounter,
    /// Mirrors the coordinator's sync count at scrape time
    pub form_syncs: IntGauge,
}

impl ApiMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let approvals = IntCounter::new(
            "mockup_suggestions_approved_total",
            "Suggestions approved and applied to the form",
        )?;
        let rejections = IntCounter::new(
            "mockup_suggestions_rejected_total",
            "Suggestions rejected",
        )?;
        let proposals = IntCounter::new(
            "mockup_proposals_received_total",
            "Proposals turned into pending suggestions",
        )?;
        let form_syncs = IntGauge::new(
            "mockup_form_syncs",
            "Debounced form syncs committed this session",
        )?;

        registry.register(Box::new(approvals.clone()))?;
        registry.register(Box::new(rejections.clone()))?;
        registry.register(Box::new(proposals.clone()))?;
        registry.register(Box::new(form_syncs.clone()))?;

        Ok(Self {
            registry,
            approvals,
            rejections,
            proposals,
            form_syncs,
        })
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
