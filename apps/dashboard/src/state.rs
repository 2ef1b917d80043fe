use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// Per-browser sessions. In memory only; a restart forgets everything.
    pub sessions: SessionStore,
    pub config: Config,
}
