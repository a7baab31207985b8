//! API errors and their HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use identity_core::domain::FieldViolation;
use identity_core::error::DomainError;
use thiserror::Error;

use crate::response::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed")]
    Validation(Vec<FieldViolation>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Locked: {0}")]
    Locked(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(violations) => ApiError::Validation(violations),
            DomainError::UserNotFound => ApiError::NotFound(err.to_string()),
            DomainError::InvalidCredentials | DomainError::InvalidToken(_) => {
                ApiError::Unauthorized(err.to_string())
            }
            DomainError::NotAllowed => ApiError::Forbidden(err.to_string()),
            DomainError::LockedOut(_) => ApiError::Locked(err.to_string()),
            DomainError::DuplicateUserName(_)
            | DomainError::DuplicateEmail(_)
            | DomainError::DuplicateLogin(_)
            | DomainError::ConcurrencyFailure => ApiError::Conflict(err.to_string()),
            DomainError::PasswordRequired => ApiError::BadRequest(err.to_string()),
            DomainError::DatabaseError(msg) => ApiError::DatabaseError(msg),
            DomainError::PasswordHashError(_)
            | DomainError::TokenGenerationError(_)
            | DomainError::InternalError(_) => ApiError::InternalError(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, violations) = match self {
            ApiError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized: {}", msg);
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg, Vec::new())
            }
            ApiError::Forbidden(msg) => {
                tracing::warn!("Forbidden: {}", msg);
                (StatusCode::FORBIDDEN, "FORBIDDEN", msg, Vec::new())
            }
            ApiError::NotFound(msg) => {
                tracing::warn!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg, Vec::new())
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, Vec::new())
            }
            ApiError::Validation(violations) => {
                tracing::warn!("Validation failed: {} error(s)", violations.len());
                (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    "One or more validation errors occurred.".to_string(),
                    violations,
                )
            }
            ApiError::Conflict(msg) => {
                tracing::warn!("Conflict: {}", msg);
                (StatusCode::CONFLICT, "CONFLICT", msg, Vec::new())
            }
            ApiError::Locked(msg) => {
                tracing::warn!("Locked out: {}", msg);
                (StatusCode::LOCKED, "LOCKED_OUT", msg, Vec::new())
            }
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR", msg, Vec::new())
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg, Vec::new())
            }
        };

        let body = Json(ApiResponse::<()>::error_with_violations(code, &message, violations));
        (status, body).into_response()
    }
}
