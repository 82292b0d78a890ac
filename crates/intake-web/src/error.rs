//! HTTP-facing errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use intake_core::{FieldErrors, IntakeError};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum WebError {
    #[error("Form validation failed")]
    Validation(FieldErrors),

    #[error("Submission too large")]
    TooLarge(FieldErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Photo storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<IntakeError> for WebError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::RecordNotFound(id) => Self::NotFound(format!("Record {}", id)),
            e => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            WebError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "errors": errors }),
            ),
            WebError::TooLarge(errors) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                serde_json::json!({ "errors": errors }),
            ),
            WebError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "error": self.to_string() }),
            ),
            WebError::BadRequest(_) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": self.to_string() }),
            ),
            WebError::Storage(_) | WebError::Internal(_) => {
                error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
