//! Axum route handlers for the JSON Evaluation API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::evaluation::evaluate;
use crate::evaluation::models::{EvaluationInput, EvaluationResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    #[serde(flatten)]
    pub input: EvaluationInput,
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    #[serde(flatten)]
    pub result: EvaluationResult,
    pub final_score: f64,
}

/// POST /api/v1/evaluations
///
/// Stateless counterpart of the dashboard's Analyze button. The key travels
/// with the request and is not stored.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>, AppError> {
    if !request.input.has_transcript() {
        return Err(AppError::Validation(
            "transcript cannot be empty".to_string(),
        ));
    }

    let result = evaluate(&state.llm, &request.api_key, &request.input).await?;
    let final_score = result.final_score();

    Ok(Json(EvaluateResponse {
        result,
        final_score,
    }))
}
