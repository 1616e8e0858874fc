//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hostauth_core::models::{ErrorBody, ErrorDetail};
use thiserror::Error;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// Validation failure naming the offending fields.
    #[error("Validation error: {message}")]
    InvalidFields {
        message: String,
        details: Vec<ErrorDetail>,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message, error_details) = match self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m, Vec::new()),
            AppError::InvalidFields { message, details } => {
                (StatusCode::BAD_REQUEST, "validation_error", message, details)
            }
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m, Vec::new()),
            AppError::Internal(detail) => {
                tracing::error!(%detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                    Vec::new(),
                )
            }
        };
        let body = Json(ErrorBody {
            status_code: status.as_u16(),
            error: error.to_string(),
            message: Some(message),
            error_details,
        });
        (status, body).into_response()
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(e: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("bcrypt: {e}"))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        AppError::Internal(format!("jwt: {e}"))
    }
}
