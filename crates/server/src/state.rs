use persona_agent::Workflow;
use persona_core::Config;

/// Shared by every request handler.
pub struct AppState {
    pub workflow: Workflow,
    /// Allowed CORS origin; `*` permits any.
    pub cors_origin: String,
    /// Redacted configuration reported by `/health`.
    pub config_summary: serde_json::Value,
}

impl AppState {
    pub fn new(workflow: Workflow, config: &Config) -> Self {
        Self {
            workflow,
            cors_origin: config.server.cors_origin.clone(),
            config_summary: config.redacted_summary(),
        }
    }
}
