//! Identity database context: one pool, the identity stores and the migrator

use std::sync::Arc;

use sqlx::migrate::Migrator;
use sqlx::SqlitePool;
use tracing::info;

use crate::database::sqlite::{SqliteAccountRepository, SqliteRoleRepository};
use crate::error::InfrastructureError;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Identity store bound to `Account`. Holds no tables of its own beyond
/// the identity schema.
#[derive(Clone)]
pub struct IdentityDbContext {
    pool: SqlitePool,
}

impl IdentityDbContext {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Applies pending migrations. Returns how many were applied.
    pub async fn migrate(&self) -> Result<usize, InfrastructureError> {
        let applied_before = self.applied_migrations().await?;
        MIGRATOR.run(&self.pool).await?;
        let applied = self.applied_migrations().await?.saturating_sub(applied_before);
        info!("Applied {} pending migration(s)", applied);
        Ok(applied)
    }

    pub async fn ping(&self) -> Result<(), InfrastructureError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub fn accounts(&self) -> Arc<SqliteAccountRepository> {
        Arc::new(SqliteAccountRepository::new(self.pool.clone()))
    }

    pub fn roles(&self) -> Arc<SqliteRoleRepository> {
        Arc::new(SqliteRoleRepository::new(self.pool.clone()))
    }

    async fn applied_migrations(&self) -> Result<usize, InfrastructureError> {
        let table: Option<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
        )
        .fetch_optional(&self.pool)
        .await?;
        if table.is_none() {
            return Ok(0);
        }

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}
