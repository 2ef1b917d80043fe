pub mod dashboard;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Dashboard (HTML)
        .route("/", get(dashboard::handle_index))
        .route("/session/api-key", post(dashboard::handle_set_api_key))
        .route("/session/recording", post(dashboard::handle_begin_recording))
        .route("/session/transcribe", post(dashboard::handle_transcribe))
        .route("/session/analyze", post(dashboard::handle_analyze))
        .route("/recap/upload", post(dashboard::handle_recap_upload))
        // Evaluation API (JSON)
        .route("/api/v1/evaluations", post(handlers::handle_evaluate))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
