//! Handlers behind the HTML dashboard. Form posts redirect back to `/`.

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::evaluate;
use crate::evaluation::models::EvaluationInput;
use crate::recap::read_recap;
use crate::render::render_dashboard;
use crate::session::{cookie, ApiKey, BusyGuard, Session, SessionError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ApiKeyForm {
    pub api_key: String,
}

struct Upload {
    file_name: Option<String>,
    data: Bytes,
}

/// Finds the named multipart field and reads it fully.
async fn read_upload(multipart: &mut Multipart, field_name: &str) -> Result<Upload, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(field_name) {
            let file_name = field.file_name().map(str::to_string);
            let data = field.bytes().await?;
            return Ok(Upload { file_name, data });
        }
    }
    Err(AppError::Validation(format!("missing '{field_name}' field")))
}

fn with_cookie(mut response: Response, id: Uuid, created: bool) -> Response {
    if created {
        cookie::attach(&mut response, id);
    }
    response
}

fn back_home(id: Uuid, created: bool) -> Response {
    with_cookie(Redirect::to("/").into_response(), id, created)
}

fn key_of(session: &Session) -> Option<ApiKey> {
    session.api_key().cloned()
}

/// GET /
pub async fn handle_index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, created) = state.sessions.resolve(cookie::session_id(&headers)).await;
    let session = state.sessions.take_for_render(id).await;
    with_cookie(Html(render_dashboard(&session)).into_response(), id, created)
}

/// POST /session/api-key
pub async fn handle_set_api_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ApiKeyForm>,
) -> Response {
    let (id, created) = state.sessions.resolve(cookie::session_id(&headers)).await;
    state
        .sessions
        .update(id, |s| s.set_api_key(&form.api_key))
        .await;
    back_home(id, created)
}

/// POST /session/recording
///
/// Called by the record button before the browser starts capturing audio.
pub async fn handle_begin_recording(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let (id, created) = state.sessions.resolve(cookie::session_id(&headers)).await;
    state.sessions.update(id, Session::begin_recording).await?;
    Ok(with_cookie(StatusCode::NO_CONTENT.into_response(), id, created))
}

/// POST /session/transcribe
///
/// Multipart field `audio` (audio/webm). Transcription failures are not HTTP
/// errors; they surface as a banner on the next render.
pub async fn handle_transcribe(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let (id, created) = state.sessions.resolve(cookie::session_id(&headers)).await;

    let audio = read_upload(&mut multipart, "audio").await?;
    if audio.data.is_empty() {
        return Err(AppError::Validation("audio recording is empty".to_string()));
    }

    let api_key = state
        .sessions
        .update(id, |s| -> Result<_, SessionError> {
            s.begin_transcription()?;
            Ok(key_of(s))
        })
        .await?;
    let guard = BusyGuard::new(&state.sessions, id);

    debug!("Transcribing {} bytes of audio", audio.data.len());
    let transcription = state
        .llm
        .transcribe(
            api_key.as_ref().map(ApiKey::expose).unwrap_or_default(),
            audio.data,
        )
        .await;

    state
        .sessions
        .update(id, |s| s.finish_transcription(transcription))
        .await;
    guard.disarm();
    Ok(back_home(id, created))
}

/// POST /session/analyze
///
/// Form fields `target_name`, `role`, `transcript`. A blank transcript is a
/// no-op: nothing is sent to the model.
pub async fn handle_analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(input): Form<EvaluationInput>,
) -> Result<Response, AppError> {
    let (id, created) = state.sessions.resolve(cookie::session_id(&headers)).await;

    let job = state
        .sessions
        .update(id, |s| -> Result<_, SessionError> {
            let input = s.begin_analysis(input)?;
            Ok(input.map(|input| (input, key_of(s))))
        })
        .await?;

    let Some((input, api_key)) = job else {
        debug!("Analyze ignored: transcript is empty");
        return Ok(back_home(id, created));
    };
    let guard = BusyGuard::new(&state.sessions, id);

    let outcome = evaluate(
        &state.llm,
        api_key.as_ref().map(ApiKey::expose).unwrap_or_default(),
        &input,
    )
    .await;
    if let Err(e) = &outcome {
        warn!("Analysis failed: {e}");
    }

    state
        .sessions
        .update(id, |s| s.finish_analysis(outcome))
        .await;
    guard.disarm();
    Ok(back_home(id, created))
}

/// POST /recap/upload
///
/// Multipart field `file`. Validates the workbook and reports its shape;
/// nothing from it reaches scoring.
pub async fn handle_recap_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let (id, created) = state.sessions.resolve(cookie::session_id(&headers)).await;

    let upload = read_upload(&mut multipart, "file").await?;
    let file_name = upload.file_name.unwrap_or_default();
    let data = upload.data;

    // Workbook parsing is CPU-bound; keep it off the async workers.
    let outcome = tokio::task::spawn_blocking(move || read_recap(&file_name, &data))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .map_err(|e| {
            warn!("Recap upload rejected: {e}");
            e.to_string()
        });

    state.sessions.update(id, |s| s.record_recap(outcome)).await;
    Ok(back_home(id, created))
}
