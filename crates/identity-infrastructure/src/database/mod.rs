//! Database module (SQLite adapters)

pub mod connection;
pub mod context;
pub mod sqlite;

pub use connection::create_pool;
pub use context::IdentityDbContext;
pub use sqlite::{SqliteAccountRepository, SqliteRoleRepository};
