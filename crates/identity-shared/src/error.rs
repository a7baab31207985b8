//! Application error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("Connection string '{0}' not found.")]
    MissingConnectionString(String),

    #[error("jwt.secret must be set to a private key outside development.")]
    InsecureSigningKey,
}
