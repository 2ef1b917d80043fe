mod config;
mod errors;
mod evaluation;
mod llm_client;
mod recap;
mod render;
mod routes;
mod session;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{LlmClient, ModelConfig};
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first so a bad PORT fails before anything starts
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting QPR dashboard v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client (the API key arrives later, per session)
    let llm = LlmClient::gemini(
        &config.gemini_api_base,
        ModelConfig {
            primary: config.primary_model.clone(),
            fallback: config.fallback_model.clone(),
            transcription: config.transcription_model.clone(),
        },
    )
    .context("Failed to build Gemini HTTP client")?;
    let models = llm.models();
    info!(
        "LLM client initialized (primary: {}, fallback: {}, transcription: {})",
        models.primary, models.fallback, models.transcription
    );

    // Build app state
    let state = AppState {
        llm,
        sessions: SessionStore::new(),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
