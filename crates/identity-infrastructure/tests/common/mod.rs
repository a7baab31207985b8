#![allow(dead_code)]

use chrono::NaiveDate;
use identity_core::domain::Account;
use identity_core::services::{AccountService, IdentityOptions};
use identity_infrastructure::{create_pool, IdentityDbContext, SqliteAccountRepository, SqliteRoleRepository};
use identity_security::TokenService;
use identity_shared::config::DatabaseSettings;

pub type SqliteAccountService = AccountService<SqliteAccountRepository, SqliteRoleRepository>;

/// In-memory identity database with migrations applied
pub async fn create_test_context() -> IdentityDbContext {
    let settings = DatabaseSettings {
        max_connections: 1,
        acquire_timeout_seconds: 3,
    };
    let pool = create_pool("sqlite::memory:", &settings)
        .await
        .expect("Failed to create test pool");

    let context = IdentityDbContext::new(pool);
    context.migrate().await.expect("Failed to run migrations");
    context
}

pub fn create_test_service(context: &IdentityDbContext) -> SqliteAccountService {
    AccountService::new(
        context.accounts(),
        context.roles(),
        TokenService::new("integration-test-secret".to_string(), 3600, 3600),
        IdentityOptions::default(),
    )
}

/// Ana Silva with every profile field filled in
pub fn ana_silva() -> Account {
    let mut account = Account::new("ana.silva@example.com");
    account.first_name = Some("Ana".to_string());
    account.last_name = Some("Silva".to_string());
    account.phone_number = Some("+351912345678".to_string());
    account.birthday = NaiveDate::from_ymd_opt(1990, 5, 12);
    account
}

