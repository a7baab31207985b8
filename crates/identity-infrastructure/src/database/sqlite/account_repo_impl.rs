// ============================================================================
// Identity Infrastructure - SQLite Account Repository
// File: crates/identity-infrastructure/src/database/sqlite/account_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::{info, warn};
use uuid::Uuid;

use identity_core::domain::{Account, ExternalLogin, IdentityUser};
use identity_core::error::DomainError;
use identity_core::repositories::AccountRepository;

use super::{database_error, is_unique_violation};

const ACCOUNT_COLUMNS: &str = r#"
    Id, UserName, NormalizedUserName, Email, NormalizedEmail, EmailConfirmed,
    PasswordHash, SecurityStamp, ConcurrencyStamp, PhoneNumber, PhoneNumberConfirmed,
    TwoFactorEnabled, LockoutEnd, LockoutEnabled, AccessFailedCount,
    FirstName, LastName, Birthday
"#;

pub struct SqliteAccountRepository {
    pool: SqlitePool,
}

impl SqliteAccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find_where(&self, filter: &str, value: &str, operation: &str) -> Result<Option<Account>, DomainError> {
        let sql = format!("SELECT {} FROM AspNetUsers WHERE {} = ?", ACCOUNT_COLUMNS, filter);
        let row: Option<AccountRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error(operation))?;

        row.map(Account::try_from).transpose()
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
#[sqlx(rename_all = "PascalCase")]
struct AccountRow {
    id: String,
    user_name: Option<String>,
    normalized_user_name: Option<String>,
    email: Option<String>,
    normalized_email: Option<String>,
    email_confirmed: bool,
    password_hash: Option<String>,
    security_stamp: Option<String>,
    concurrency_stamp: Option<String>,
    phone_number: Option<String>,
    phone_number_confirmed: bool,
    two_factor_enabled: bool,
    lockout_end: Option<DateTime<Utc>>,
    lockout_enabled: bool,
    access_failed_count: i32,
    first_name: Option<String>,
    last_name: Option<String>,
    birthday: Option<NaiveDate>,
}

impl TryFrom<AccountRow> for Account {
    type Error = DomainError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let id = parse_id(&row.id)?;
        Ok(Account {
            identity: IdentityUser {
                id,
                user_name: row.user_name.unwrap_or_default(),
                normalized_user_name: row.normalized_user_name.unwrap_or_default(),
                email: row.email.unwrap_or_default(),
                normalized_email: row.normalized_email.unwrap_or_default(),
                email_confirmed: row.email_confirmed,
                password_hash: row.password_hash,
                security_stamp: row.security_stamp.unwrap_or_default(),
                concurrency_stamp: row.concurrency_stamp.unwrap_or_default(),
                phone_number_confirmed: row.phone_number_confirmed,
                two_factor_enabled: row.two_factor_enabled,
                lockout_end: row.lockout_end,
                lockout_enabled: row.lockout_enabled,
                access_failed_count: row.access_failed_count,
            },
            first_name: row.first_name,
            last_name: row.last_name,
            phone_number: row.phone_number,
            birthday: row.birthday,
        })
    }
}

#[derive(Debug, FromRow)]
#[sqlx(rename_all = "PascalCase")]
struct LoginRow {
    login_provider: String,
    provider_key: String,
    provider_display_name: Option<String>,
    user_id: String,
}

impl TryFrom<LoginRow> for ExternalLogin {
    type Error = DomainError;

    fn try_from(row: LoginRow) -> Result<Self, Self::Error> {
        Ok(ExternalLogin {
            user_id: parse_id(&row.user_id)?,
            login_provider: row.login_provider,
            provider_key: row.provider_key,
            provider_display_name: row.provider_display_name,
        })
    }
}

fn parse_id(value: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(value).map_err(|e| DomainError::DatabaseError(format!("Invalid id '{}': {}", value, e)))
}

#[async_trait]
impl AccountRepository for SqliteAccountRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Account>, DomainError> {
        self.find_where("Id", &id.to_string(), "finding user by id").await
    }

    async fn find_by_normalized_user_name(&self, normalized_user_name: &str) -> Result<Option<Account>, DomainError> {
        self.find_where("NormalizedUserName", normalized_user_name, "finding user by user name")
            .await
    }

    async fn find_by_normalized_email(&self, normalized_email: &str) -> Result<Option<Account>, DomainError> {
        // Email is not unique at the schema level; the oldest match wins
        let sql = format!(
            "SELECT {} FROM AspNetUsers WHERE NormalizedEmail = ? ORDER BY rowid LIMIT 1",
            ACCOUNT_COLUMNS
        );
        let row: Option<AccountRow> = sqlx::query_as(&sql)
            .bind(normalized_email)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error("finding user by email"))?;

        row.map(Account::try_from).transpose()
    }

    async fn find_by_login(&self, login_provider: &str, provider_key: &str) -> Result<Option<Account>, DomainError> {
        let sql = format!(
            r#"
            SELECT {} FROM AspNetUsers
            WHERE Id = (
                SELECT UserId FROM AspNetUserLogins
                WHERE LoginProvider = ? AND ProviderKey = ?
            )
            "#,
            ACCOUNT_COLUMNS
        );
        let row: Option<AccountRow> = sqlx::query_as(&sql)
            .bind(login_provider)
            .bind(provider_key)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error("finding user by external login"))?;

        row.map(Account::try_from).transpose()
    }

    async fn create(&self, account: &Account) -> Result<Account, DomainError> {
        let user = &account.identity;
        let result = sqlx::query(
            r#"
            INSERT INTO AspNetUsers (
                Id, UserName, NormalizedUserName, Email, NormalizedEmail, EmailConfirmed,
                PasswordHash, SecurityStamp, ConcurrencyStamp, PhoneNumber, PhoneNumberConfirmed,
                TwoFactorEnabled, LockoutEnd, LockoutEnabled, AccessFailedCount,
                FirstName, LastName, Birthday
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.user_name)
        .bind(&user.normalized_user_name)
        .bind(&user.email)
        .bind(&user.normalized_email)
        .bind(user.email_confirmed)
        .bind(&user.password_hash)
        .bind(&user.security_stamp)
        .bind(&user.concurrency_stamp)
        .bind(&account.phone_number)
        .bind(user.phone_number_confirmed)
        .bind(user.two_factor_enabled)
        .bind(user.lockout_end)
        .bind(user.lockout_enabled)
        .bind(user.access_failed_count)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.birthday)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!("User created: {}", user.id);
                Ok(account.clone())
            }
            Err(e) if is_unique_violation(&e) => {
                warn!("User name already exists: {}", user.normalized_user_name);
                Err(DomainError::DuplicateUserName(user.user_name.clone()))
            }
            Err(e) => Err(database_error("creating user")(e)),
        }
    }

    async fn update(&self, account: &Account, expected_concurrency_stamp: &str) -> Result<Account, DomainError> {
        let user = &account.identity;
        let result = sqlx::query(
            r#"
            UPDATE AspNetUsers SET
                UserName = ?, NormalizedUserName = ?, Email = ?, NormalizedEmail = ?,
                EmailConfirmed = ?, PasswordHash = ?, SecurityStamp = ?, ConcurrencyStamp = ?,
                PhoneNumber = ?, PhoneNumberConfirmed = ?, TwoFactorEnabled = ?,
                LockoutEnd = ?, LockoutEnabled = ?, AccessFailedCount = ?,
                FirstName = ?, LastName = ?, Birthday = ?
            WHERE Id = ? AND ConcurrencyStamp = ?
            "#,
        )
        .bind(&user.user_name)
        .bind(&user.normalized_user_name)
        .bind(&user.email)
        .bind(&user.normalized_email)
        .bind(user.email_confirmed)
        .bind(&user.password_hash)
        .bind(&user.security_stamp)
        .bind(&user.concurrency_stamp)
        .bind(&account.phone_number)
        .bind(user.phone_number_confirmed)
        .bind(user.two_factor_enabled)
        .bind(user.lockout_end)
        .bind(user.lockout_enabled)
        .bind(user.access_failed_count)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.birthday)
        .bind(user.id.to_string())
        .bind(expected_concurrency_stamp)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => {
                warn!("Concurrency stamp mismatch updating user: {}", user.id);
                Err(DomainError::ConcurrencyFailure)
            }
            Ok(_) => Ok(account.clone()),
            Err(e) if is_unique_violation(&e) => Err(DomainError::DuplicateUserName(user.user_name.clone())),
            Err(e) => Err(database_error("updating user")(e)),
        }
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let done = sqlx::query("DELETE FROM AspNetUsers WHERE Id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(database_error("deleting user"))?;

        if done.rows_affected() == 0 {
            return Err(DomainError::UserNotFound);
        }
        info!("User deleted: {}", id);
        Ok(())
    }

    async fn add_login(&self, login: &ExternalLogin) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO AspNetUserLogins (LoginProvider, ProviderKey, ProviderDisplayName, UserId)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&login.login_provider)
        .bind(&login.provider_key)
        .bind(&login.provider_display_name)
        .bind(login.user_id.to_string())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(DomainError::DuplicateLogin(login.login_provider.clone())),
            Err(e) => Err(database_error("adding external login")(e)),
        }
    }

    async fn logins(&self, user_id: &Uuid) -> Result<Vec<ExternalLogin>, DomainError> {
        let rows: Vec<LoginRow> = sqlx::query_as(
            r#"
            SELECT LoginProvider, ProviderKey, ProviderDisplayName, UserId
            FROM AspNetUserLogins
            WHERE UserId = ?
            ORDER BY LoginProvider
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("listing external logins"))?;

        rows.into_iter().map(ExternalLogin::try_from).collect()
    }
}
