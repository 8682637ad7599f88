//! Request handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::error::ApiError;
use super::AppState;
use crate::features::normalize_json;
use crate::pipeline::{PipelineKind, Prediction};

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: Prediction,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Validate and normalize the body, then run the `kind` pipeline on it.
///
/// Shared by both prediction routes.
pub async fn predict(
    State(state): State<AppState>,
    kind: PipelineKind,
    body: Bytes,
) -> Result<Json<PredictResponse>, ApiError> {
    let row = normalize_json(&body)?;
    let prediction = state.pipeline(kind).predict_row(&row)?;
    Ok(Json(PredictResponse { prediction }))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
