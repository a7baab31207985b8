//! # Identity Infrastructure
//!
//! SQLite persistence for the identity store (adapters).

pub mod database;
pub mod error;

pub use database::{create_pool, IdentityDbContext, SqliteAccountRepository, SqliteRoleRepository};
pub use error::InfrastructureError;
