use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A score outside 0–100 reached the core. The grader is expected to
    /// clamp, but the core re-validates before any state transition.
    #[error("Invalid score: {0}")]
    InvalidScore(i32),

    /// The atomic attempt-plus-card commit lost a concurrent race.
    /// Retryable: no partial state was persisted.
    #[error("Conflicting update on card {0}")]
    Conflict(uuid::Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Grader error: {0}")]
    Grader(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidScore(score) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_SCORE",
                format!("Score {score} is outside the 0-100 range"),
            ),
            AppError::Conflict(card_id) => (
                StatusCode::CONFLICT,
                "TRANSACTION_CONFLICT",
                format!("Card {card_id} was updated concurrently; retry the request"),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Grader(msg) => {
                tracing::error!("Grader error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "GRADER_ERROR",
                    "An AI grading error occurred".to_string(),
                )
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
