use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_API_BASE, DEFAULT_FALLBACK_MODEL, DEFAULT_PRIMARY_MODEL};

/// Application configuration loaded from environment variables.
///
/// Holds no API key: the Gemini key is entered per session through the dashboard
/// and lives only in session memory.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub gemini_api_base: String,
    pub primary_model: String,
    pub fallback_model: String,
    pub transcription_model: String,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let primary_model = env_or("GEMINI_PRIMARY_MODEL", DEFAULT_PRIMARY_MODEL);
        let max_upload_mb = env_or("MAX_UPLOAD_MB", "25")
            .parse::<usize>()
            .context("MAX_UPLOAD_MB must be a whole number of megabytes")?;

        Ok(Config {
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            gemini_api_base: env_or("GEMINI_API_BASE", DEFAULT_API_BASE)
                .trim_end_matches('/')
                .to_string(),
            fallback_model: env_or("GEMINI_FALLBACK_MODEL", DEFAULT_FALLBACK_MODEL),
            transcription_model: env_or("GEMINI_TRANSCRIPTION_MODEL", &primary_model),
            primary_model,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
