//! Domain errors

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::FieldViolation;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User not found")]
    UserNotFound,

    #[error("Invalid login attempt")]
    InvalidCredentials,

    #[error("Sign in is not allowed until the email is confirmed")]
    NotAllowed,

    #[error("User account locked out until {0}")]
    LockedOut(DateTime<Utc>),

    #[error("Username '{0}' is already taken.")]
    DuplicateUserName(String),

    #[error("Email '{0}' is already taken.")]
    DuplicateEmail(String),

    #[error("A user with this login already exists: {0}")]
    DuplicateLogin(String),

    #[error("Validation failed: {} error(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Optimistic concurrency failure, object has been modified.")]
    ConcurrencyFailure,

    #[error("Password required")]
    PasswordRequired,

    #[error("Password hash error: {0}")]
    PasswordHashError(String),

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
