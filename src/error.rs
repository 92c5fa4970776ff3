use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Application-level error taxonomy.
///
/// Every handler returns `Result<_, AppError>`; the `IntoResponse` impl maps
/// each variant to a status code and an `{"error": ...}` JSON body.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed request input.
    #[error("{0}")]
    Validation(String),

    /// A unique field (username, email) is already taken.
    #[error("{0}")]
    Conflict(String),

    /// No matching record.
    #[error("{0}")]
    NotFound(String),

    /// Credential mismatch.
    #[error("{0}")]
    Unauthorized(String),

    /// An external collaborator (object storage, model API, mail relay)
    /// failed. The message is caller-safe; cause detail is logged where the
    /// error is raised.
    #[error("{0}")]
    Upstream(String),

    /// Any database failure.
    #[error("database error")]
    Store(#[from] sqlx::Error),

    /// Catch-all for unexpected failures.
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            // Duplicates map to 400 on this API surface, not 409.
            AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Upstream(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Store(e) => {
                error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
