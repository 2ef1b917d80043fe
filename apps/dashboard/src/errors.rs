use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::evaluation::EvaluationError;
use crate::llm_client::LlmError;
use crate::session::SessionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("AI service error: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<EvaluationError> for AppError {
    fn from(e: EvaluationError) -> Self {
        match e {
            EvaluationError::Model(LlmError::MissingApiKey) => {
                AppError::Validation("api_key cannot be empty".to_string())
            }
            EvaluationError::Model(_) => AppError::Upstream(e.to_string()),
            EvaluationError::Format(_) => AppError::UnprocessableEntity(e.to_string()),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Conflict(e.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::Validation(format!("Invalid upload: {e}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Upstream(msg) => {
                tracing::error!("AI service error: {msg}");
                (StatusCode::BAD_GATEWAY, "AI_SERVICE_ERROR", msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::parser::parse_scoring_response;

    #[test]
    fn test_format_error_maps_to_422_with_generic_message() {
        let parse_err = parse_scoring_response("not json").unwrap_err();
        let err = AppError::from(EvaluationError::Format(parse_err));
        assert!(matches!(
            &err,
            AppError::UnprocessableEntity(msg) if msg == "Could not read the AI output format."
        ));
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_missing_key_is_a_validation_error() {
        let err = AppError::from(EvaluationError::Model(LlmError::MissingApiKey));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_exhausted_fallback_is_bad_gateway() {
        let err = AppError::from(EvaluationError::Model(LlmError::FallbackExhausted {
            primary: Box::new(LlmError::EmptyContent),
            last: Box::new(LlmError::EmptyContent),
        }));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
