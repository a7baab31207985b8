// ============================================================================
// Identity Infrastructure - SQLite Role Repository
// File: crates/identity-infrastructure/src/database/sqlite/role_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use tracing::info;
use uuid::Uuid;

use identity_core::domain::Role;
use identity_core::error::DomainError;
use identity_core::repositories::RoleRepository;

use super::{database_error, is_unique_violation};

pub struct SqliteRoleRepository {
    pool: SqlitePool,
}

impl SqliteRoleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
#[sqlx(rename_all = "PascalCase")]
struct RoleRow {
    id: String,
    name: Option<String>,
    normalized_name: Option<String>,
    concurrency_stamp: Option<String>,
}

impl TryFrom<RoleRow> for Role {
    type Error = DomainError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| DomainError::DatabaseError(format!("Invalid role id '{}': {}", row.id, e)))?;
        Ok(Role {
            id,
            name: row.name.unwrap_or_default(),
            normalized_name: row.normalized_name.unwrap_or_default(),
            concurrency_stamp: row.concurrency_stamp.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl RoleRepository for SqliteRoleRepository {
    async fn find_by_normalized_name(&self, normalized_name: &str) -> Result<Option<Role>, DomainError> {
        let row: Option<RoleRow> = sqlx::query_as(
            "SELECT Id, Name, NormalizedName, ConcurrencyStamp FROM AspNetRoles WHERE NormalizedName = ?",
        )
        .bind(normalized_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("finding role"))?;

        row.map(Role::try_from).transpose()
    }

    async fn create(&self, role: &Role) -> Result<Role, DomainError> {
        let result = sqlx::query(
            "INSERT INTO AspNetRoles (Id, Name, NormalizedName, ConcurrencyStamp) VALUES (?, ?, ?, ?)",
        )
        .bind(role.id.to_string())
        .bind(&role.name)
        .bind(&role.normalized_name)
        .bind(&role.concurrency_stamp)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!("Role created: {}", role.name);
                Ok(role.clone())
            }
            Err(e) if is_unique_violation(&e) => Err(DomainError::InternalError(format!(
                "Role name '{}' is already taken.",
                role.name
            ))),
            Err(e) => Err(database_error("creating role")(e)),
        }
    }

    async fn add_user_to_role(&self, user_id: &Uuid, role_id: &Uuid) -> Result<(), DomainError> {
        sqlx::query("INSERT OR IGNORE INTO AspNetUserRoles (UserId, RoleId) VALUES (?, ?)")
            .bind(user_id.to_string())
            .bind(role_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(database_error("adding user to role"))?;
        Ok(())
    }

    async fn roles_for_user(&self, user_id: &Uuid) -> Result<Vec<String>, DomainError> {
        let rows: Vec<(Option<String>,)> = sqlx::query_as(
            r#"
            SELECT r.Name
            FROM AspNetRoles r
            INNER JOIN AspNetUserRoles ur ON ur.RoleId = r.Id
            WHERE ur.UserId = ?
            ORDER BY r.Name
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("listing user roles"))?;

        Ok(rows.into_iter().filter_map(|(name,)| name).collect())
    }
}
