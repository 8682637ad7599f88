//! Mapping of core errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::Error;
use crate::features::ValidationError;

/// Body of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

/// A request that could not be answered.
///
/// Every core failure is the caller's problem from the service's point of
/// view and becomes `400 Bad Request` with `{"detail": <message>}`.
#[derive(Debug)]
pub struct ApiError {
    detail: String,
}

impl ApiError {
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        tracing::debug!(kind = ?err.kind(), error = %err, "rejecting request");
        Self {
            detail: err.to_string(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Error::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(ErrorBody { detail: self.detail })).into_response()
    }
}
