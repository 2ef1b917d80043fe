//! Per-browser session state: the transcript being edited, the user's API key,
//! the last result, and where the session sits in the record → analyze flow.
//!
//! Sessions live in memory only and are keyed by an opaque cookie.

pub mod cookie;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::evaluation::models::{EvaluationInput, EvaluationResult};
use crate::evaluation::EvaluationError;
use crate::llm_client::Transcription;
use crate::recap::RecapSummary;

/// Sessions untouched for this long are dropped the next time a session is resolved.
const SESSION_IDLE_LIMIT_HOURS: i64 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    Recording,
    Transcribing,
    TranscriptReady,
    Analyzing,
    ResultReady,
}

impl Phase {
    /// A request to the model is in flight.
    pub fn is_busy(self) -> bool {
        matches!(self, Phase::Transcribing | Phase::Analyzing)
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session is busy ({0:?}); wait for the current request to finish")]
    Busy(Phase),
}

/// Banner shown once on the next page render.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Success(String),
    Info(String),
    Error(String),
}

/// User-supplied Gemini key. Never printed.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    api_key: Option<ApiKey>,
    pub input: EvaluationInput,
    pub phase: Phase,
    pub result: Option<EvaluationResult>,
    pub recap: Option<RecapSummary>,
    pub notice: Option<Notice>,
    last_seen: DateTime<Utc>,
}

impl Session {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            api_key: None,
            input: EvaluationInput::default(),
            phase: Phase::Idle,
            result: None,
            recap: None,
            notice: None,
            last_seen: Utc::now(),
        }
    }

    pub fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Stores the key; a blank submission clears it.
    pub fn set_api_key(&mut self, key: &str) {
        let key = key.trim();
        if key.is_empty() {
            self.api_key = None;
            self.notice = Some(Notice::Info("API key cleared.".to_string()));
        } else {
            self.api_key = Some(ApiKey(key.to_string()));
            self.notice = Some(Notice::Success("AI is ready to evaluate.".to_string()));
        }
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        if self.phase.is_busy() {
            return Err(SessionError::Busy(self.phase));
        }
        Ok(())
    }

    pub fn begin_recording(&mut self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.phase = Phase::Recording;
        Ok(())
    }

    pub fn begin_transcription(&mut self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.phase = Phase::Transcribing;
        self.notice = None;
        Ok(())
    }

    /// On failure the existing transcript is kept and the fallback text is shown as an error.
    pub fn finish_transcription(&mut self, transcription: Transcription) {
        match &transcription {
            Transcription::Text(text) => {
                self.input.transcript = text.clone();
                self.notice = Some(Notice::Success("Voice recorded!".to_string()));
            }
            Transcription::Fallback { reason } => {
                debug!("Transcription fell back: {reason}");
                self.notice = Some(Notice::Error(transcription.display_text().to_string()));
            }
        }
        self.phase = Phase::TranscriptReady;
    }

    /// Applies the submitted form and, if there is something to analyze,
    /// moves to `Analyzing`. Returns `None` for an empty transcript (no-op).
    pub fn begin_analysis(
        &mut self,
        input: EvaluationInput,
    ) -> Result<Option<EvaluationInput>, SessionError> {
        self.ensure_idle()?;
        self.input = input;
        if !self.input.has_transcript() {
            if self.phase == Phase::Recording {
                self.phase = Phase::Idle;
            }
            return Ok(None);
        }
        self.phase = Phase::Analyzing;
        self.notice = None;
        Ok(Some(self.input.clone()))
    }

    pub fn finish_analysis(&mut self, outcome: Result<EvaluationResult, EvaluationError>) {
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.phase = Phase::ResultReady;
            }
            Err(e) => {
                self.result = None;
                self.notice = Some(Notice::Error(e.to_string()));
                self.phase = Phase::TranscriptReady;
            }
        }
    }

    /// Releases a session whose model request was dropped before it finished.
    /// No-op unless the session is still busy.
    pub fn abandon_request(&mut self) {
        if !self.phase.is_busy() {
            return;
        }
        if self.phase == Phase::Analyzing {
            self.result = None;
        }
        warn!("Session {} abandoned a {:?} request", self.id, self.phase);
        self.notice = Some(Notice::Error(
            "The previous request was interrupted. Please try again.".to_string(),
        ));
        self.phase = Phase::TranscriptReady;
    }

    pub fn record_recap(&mut self, outcome: Result<RecapSummary, String>) {
        match outcome {
            Ok(summary) => {
                self.notice = Some(Notice::Info(format!(
                    "Excel recap loaded: {} member rows, {} columns. Scoring from Excel is not enabled.",
                    summary.member_rows,
                    summary.columns.len()
                )));
                self.recap = Some(summary);
            }
            Err(message) => {
                self.recap = None;
                self.notice = Some(Notice::Error(message));
            }
        }
    }
}

/// In-memory session map shared by all handlers.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session for `id`, creating a fresh one (with a new id) when
    /// the id is absent or unknown. The flag is true when a session was created.
    pub async fn resolve(&self, id: Option<Uuid>) -> (Uuid, bool) {
        let mut sessions = self.inner.lock().await;
        let now = Utc::now();

        if let Some(session) = id.and_then(|id| sessions.get_mut(&id)) {
            session.last_seen = now;
            return (session.id, false);
        }

        let cutoff = now - Duration::hours(SESSION_IDLE_LIMIT_HOURS);
        let before = sessions.len();
        sessions.retain(|_, s| s.last_seen > cutoff);
        if sessions.len() < before {
            info!("Dropped {} idle sessions", before - sessions.len());
        }

        let id = Uuid::new_v4();
        sessions.insert(id, Session::new(id));
        debug!("Created session {id}");
        (id, true)
    }

    /// Runs `f` against the session under the store lock. Never hold this
    /// across a model call.
    pub async fn update<R>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut sessions = self.inner.lock().await;
        let session = sessions.entry(id).or_insert_with(|| Session::new(id));
        session.last_seen = Utc::now();
        f(session)
    }

    /// Clones the session for rendering and clears its one-shot notice.
    pub async fn take_for_render(&self, id: Uuid) -> Session {
        self.update(id, |s| {
            let snapshot = s.clone();
            s.notice = None;
            snapshot
        })
        .await
    }
}

/// Held while a model request is in flight. If the request future is dropped
/// (client disconnect) before `disarm`, the session goes back to `TranscriptReady`.
pub struct BusyGuard {
    store: SessionStore,
    id: Uuid,
    armed: bool,
}

impl BusyGuard {
    pub fn new(store: &SessionStore, id: Uuid) -> Self {
        Self {
            store: store.clone(),
            id,
            armed: true,
        }
    }

    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let id = self.id;
        match self.store.inner.try_lock() {
            Ok(mut sessions) => {
                if let Some(session) = sessions.get_mut(&id) {
                    session.abandon_request();
                }
            }
            Err(_) => {
                let store = self.store.clone();
                if let Ok(handle) = tokio::runtime::Handle::try_current() {
                    handle.spawn(async move {
                        store.update(id, Session::abandon_request).await;
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::models::Role;
    use crate::llm_client::prompts::TRANSCRIPTION_FALLBACK_TEXT;
    use crate::llm_client::LlmError;

    fn typed(transcript: &str) -> EvaluationInput {
        EvaluationInput {
            target_name: "Budi".to_string(),
            role: Role::DeputyHead,
            transcript: transcript.to_string(),
        }
    }

    #[test]
    fn test_typed_transcript_goes_straight_to_analysis() {
        let mut s = Session::new(Uuid::new_v4());
        let input = s.begin_analysis(typed("rajin dan cepat")).unwrap();
        assert!(input.is_some());
        assert_eq!(s.phase, Phase::Analyzing);
    }

    #[test]
    fn test_blank_transcript_analysis_is_noop() {
        let mut s = Session::new(Uuid::new_v4());
        assert!(s.begin_analysis(typed("   ")).unwrap().is_none());
        assert_eq!(s.phase, Phase::Idle);
    }

    #[test]
    fn test_recording_flow_fills_transcript() {
        let mut s = Session::new(Uuid::new_v4());
        s.begin_recording().unwrap();
        assert_eq!(s.phase, Phase::Recording);
        s.begin_transcription().unwrap();
        s.finish_transcription(Transcription::Text("kerja bagus".to_string()));
        assert_eq!(s.phase, Phase::TranscriptReady);
        assert_eq!(s.input.transcript, "kerja bagus");
    }

    #[test]
    fn test_failed_transcription_preserves_transcript() {
        let mut s = Session::new(Uuid::new_v4());
        s.input.transcript = "typed earlier".to_string();
        s.begin_transcription().unwrap();
        s.finish_transcription(Transcription::Fallback {
            reason: "404".to_string(),
        });
        assert_eq!(s.phase, Phase::TranscriptReady);
        assert_eq!(s.input.transcript, "typed earlier");
        assert_eq!(
            s.notice,
            Some(Notice::Error(TRANSCRIPTION_FALLBACK_TEXT.to_string()))
        );
    }

    #[test]
    fn test_busy_session_rejects_new_requests() {
        let mut s = Session::new(Uuid::new_v4());
        s.begin_analysis(typed("ok")).unwrap();
        assert!(matches!(
            s.begin_transcription(),
            Err(SessionError::Busy(Phase::Analyzing))
        ));
        assert!(s.begin_analysis(typed("again")).is_err());
        assert!(s.begin_recording().is_err());
    }

    #[test]
    fn test_failed_analysis_returns_to_transcript_ready() {
        let mut s = Session::new(Uuid::new_v4());
        s.begin_analysis(typed("telat terus")).unwrap();
        s.finish_analysis(Err(EvaluationError::Model(LlmError::MissingApiKey)));
        assert_eq!(s.phase, Phase::TranscriptReady);
        assert_eq!(s.input.transcript, "telat terus");
        assert!(matches!(s.notice, Some(Notice::Error(_))));
    }

    #[test]
    fn test_api_key_is_redacted_in_debug() {
        let mut s = Session::new(Uuid::new_v4());
        s.set_api_key("  secret-key  ");
        assert_eq!(s.api_key().unwrap().expose(), "secret-key");
        assert!(!format!("{s:?}").contains("secret-key"));
        s.set_api_key("");
        assert!(!s.has_api_key());
    }

    #[tokio::test]
    async fn test_store_reuses_known_ids_and_replaces_unknown() {
        let store = SessionStore::new();
        let (id, created) = store.resolve(None).await;
        assert!(created);
        assert_eq!(store.resolve(Some(id)).await, (id, false));

        let (other, created) = store.resolve(Some(Uuid::new_v4())).await;
        assert!(created);
        assert_ne!(other, id);
    }

    #[test]
    fn test_abandon_only_touches_busy_sessions() {
        let mut s = Session::new(Uuid::new_v4());
        s.abandon_request();
        assert_eq!(s.phase, Phase::Idle);
        assert!(s.notice.is_none());

        s.begin_analysis(typed("telat terus")).unwrap();
        s.abandon_request();
        assert_eq!(s.phase, Phase::TranscriptReady);
        assert_eq!(s.input.transcript, "telat terus");
        assert!(matches!(s.notice, Some(Notice::Error(_))));
    }

    #[tokio::test]
    async fn test_dropped_guard_releases_busy_session() {
        let store = SessionStore::new();
        let (id, _) = store.resolve(None).await;
        store
            .update(id, |s| s.begin_transcription())
            .await
            .unwrap();

        drop(BusyGuard::new(&store, id));
        assert_eq!(store.update(id, |s| s.phase).await, Phase::TranscriptReady);
    }

    #[tokio::test]
    async fn test_disarmed_guard_leaves_session_alone() {
        let store = SessionStore::new();
        let (id, _) = store.resolve(None).await;
        store.update(id, |s| s.begin_transcription()).await.unwrap();

        BusyGuard::new(&store, id).disarm();
        assert_eq!(store.update(id, |s| s.phase).await, Phase::Transcribing);
    }

    #[tokio::test]
    async fn test_notice_is_shown_once() {
        let store = SessionStore::new();
        let (id, _) = store.resolve(None).await;
        store.update(id, |s| s.set_api_key("k")).await;
        assert!(store.take_for_render(id).await.notice.is_some());
        assert!(store.take_for_render(id).await.notice.is_none());
    }
}
