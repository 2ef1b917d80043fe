//! LLM Client — the single point of entry for all Gemini calls in the dashboard.
//!
//! ARCHITECTURAL RULE: No other module may call the Gemini API directly.
//! Scoring and transcription both go through `LlmClient`, which owns the
//! model fallback policy. The wire transport sits behind `GenerativeBackend`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod prompts;

use prompts::{TRANSCRIPTION_FALLBACK_TEXT, TRANSCRIPTION_INSTRUCTION};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_PRIMARY_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_FALLBACK_MODEL: &str = "gemini-pro";
/// Browsers' MediaRecorder default container; the record button uploads this.
pub const AUDIO_MIME_TYPE: &str = "audio/webm";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("No API key provided")]
    MissingApiKey,

    #[error("Both models failed. Primary: {primary}. Last error: {last}")]
    FallbackExhausted {
        primary: Box<LlmError>,
        last: Box<LlmError>,
    },
}

/// One piece of a single-turn request.
#[derive(Debug, Clone)]
pub enum Part {
    Text(String),
    InlineData { mime_type: String, data: Bytes },
}

/// The transport seam. `GeminiBackend` talks HTTP; tests swap in stubs.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(&self, api_key: &str, model: &str, parts: &[Part])
        -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini REST wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

impl<'a> From<&'a Part> for RequestPart<'a> {
    fn from(part: &'a Part) -> Self {
        match part {
            Part::Text(text) => RequestPart::Text { text },
            Part::InlineData { mime_type, data } => RequestPart::Inline {
                inline_data: InlineData {
                    mime_type,
                    data: STANDARD.encode(data),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// reqwest-backed `generateContent` transport.
pub struct GeminiBackend {
    client: Client,
    api_base: String,
}

impl GeminiBackend {
    pub fn new(api_base: impl Into<String>) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_base: api_base.into(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.api_base)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn generate(
        &self,
        api_key: &str,
        model: &str,
        parts: &[Part],
    ) -> Result<String, LlmError> {
        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: parts.iter().map(RequestPart::from).collect(),
            }],
        };

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let response: GenerateContentResponse = response.json().await?;
        if let Some(usage) = &response.usage_metadata {
            debug!(
                "Gemini call succeeded: model={model}, prompt_tokens={}, output_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        response.text().ok_or(LlmError::EmptyContent)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client: model selection and fallback policy
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub primary: String,
    pub fallback: String,
    pub transcription: String,
}

/// Outcome of a transcription request. Failures never propagate as errors;
/// the caller decides how to present the fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum Transcription {
    Text(String),
    Fallback { reason: String },
}

impl Transcription {
    /// The text to show the user: the transcript, or the type-it-manually notice.
    pub fn display_text(&self) -> &str {
        match self {
            Transcription::Text(text) => text.as_str(),
            Transcription::Fallback { .. } => TRANSCRIPTION_FALLBACK_TEXT,
        }
    }
}

/// The single LLM client shared by every handler.
#[derive(Clone)]
pub struct LlmClient {
    backend: Arc<dyn GenerativeBackend>,
    models: ModelConfig,
}

impl LlmClient {
    pub fn gemini(api_base: &str, models: ModelConfig) -> Result<Self, LlmError> {
        Ok(Self::with_backend(
            Arc::new(GeminiBackend::new(api_base)?),
            models,
        ))
    }

    pub fn with_backend(backend: Arc<dyn GenerativeBackend>, models: ModelConfig) -> Self {
        Self { backend, models }
    }

    pub fn models(&self) -> &ModelConfig {
        &self.models
    }

    /// Transcribes recorded audio verbatim (Indonesian).
    pub async fn transcribe(&self, api_key: &str, audio: Bytes) -> Transcription {
        if api_key.trim().is_empty() {
            return Transcription::Fallback {
                reason: LlmError::MissingApiKey.to_string(),
            };
        }

        let parts = [
            Part::Text(TRANSCRIPTION_INSTRUCTION.to_string()),
            Part::InlineData {
                mime_type: AUDIO_MIME_TYPE.to_string(),
                data: audio,
            },
        ];

        match self
            .backend
            .generate(api_key, &self.models.transcription, &parts)
            .await
        {
            Ok(text) => Transcription::Text(text.trim().to_string()),
            Err(e) => {
                warn!(
                    "Transcription with {} failed: {e}",
                    self.models.transcription
                );
                Transcription::Fallback {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Sends a scoring prompt to the primary model, then once to the fallback
    /// model if the primary fails. Returns the raw model text.
    pub async fn score_transcript(&self, api_key: &str, prompt: &str) -> Result<String, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let parts = [Part::Text(prompt.to_string())];

        let primary = match self
            .backend
            .generate(api_key, &self.models.primary, &parts)
            .await
        {
            Ok(text) => return Ok(text),
            Err(e) => e,
        };

        warn!(
            "Primary model {} failed ({primary}); falling back to {}",
            self.models.primary, self.models.fallback
        );

        match self
            .backend
            .generate(api_key, &self.models.fallback, &parts)
            .await
        {
            Ok(text) => {
                info!("Fallback model {} answered", self.models.fallback);
                Ok(text)
            }
            Err(last) => Err(LlmError::FallbackExhausted {
                primary: Box::new(primary),
                last: Box::new(last),
            }),
        }
    }
}

#[cfg(test)]
pub mod testing {
    //! Stub backends shared by tests across the crate.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Replies per model name; models without a reply fail with a 404.
    #[derive(Default)]
    pub struct StubBackend {
        replies: Vec<(String, String)>,
        calls: AtomicUsize,
        seen_models: Mutex<Vec<String>>,
    }

    impl StubBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply(mut self, model: &str, text: &str) -> Self {
            self.replies.push((model.to_string(), text.to_string()));
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn seen_models(&self) -> Vec<String> {
            self.seen_models.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerativeBackend for StubBackend {
        async fn generate(
            &self,
            _api_key: &str,
            model: &str,
            _parts: &[Part],
        ) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_models.lock().unwrap().push(model.to_string());
            self.replies
                .iter()
                .find(|(m, _)| m == model)
                .map(|(_, text)| text.clone())
                .ok_or_else(|| LlmError::Api {
                    status: 404,
                    message: format!("models/{model} is not found"),
                })
        }
    }

    pub fn stub_models() -> ModelConfig {
        ModelConfig {
            primary: "primary-model".to_string(),
            fallback: "fallback-model".to_string(),
            transcription: "primary-model".to_string(),
        }
    }
}
