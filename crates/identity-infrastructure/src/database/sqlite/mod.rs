//! SQLite repository implementations

mod account_repo_impl;
mod role_repo_impl;

pub use account_repo_impl::SqliteAccountRepository;
pub use role_repo_impl::SqliteRoleRepository;

use identity_core::error::DomainError;
use tracing::error;

/// Maps a sqlx error to the domain, logging it with the failed operation.
pub(crate) fn database_error(operation: &str) -> impl FnOnce(sqlx::Error) -> DomainError + '_ {
    move |e| {
        error!("Database error {}: {}", operation, e);
        DomainError::DatabaseError(e.to_string())
    }
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}
