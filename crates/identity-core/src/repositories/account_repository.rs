//! Account store trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{Account, ExternalLogin};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Account>, DomainError>;
    async fn find_by_normalized_user_name(&self, normalized_user_name: &str) -> Result<Option<Account>, DomainError>;
    async fn find_by_normalized_email(&self, normalized_email: &str) -> Result<Option<Account>, DomainError>;
    async fn find_by_login(&self, login_provider: &str, provider_key: &str) -> Result<Option<Account>, DomainError>;
    async fn create(&self, account: &Account) -> Result<Account, DomainError>;
    /// Persists `account` only if the stored concurrency stamp still equals
    /// `expected_concurrency_stamp`.
    async fn update(&self, account: &Account, expected_concurrency_stamp: &str) -> Result<Account, DomainError>;
    async fn delete(&self, id: &Uuid) -> Result<(), DomainError>;
    async fn add_login(&self, login: &ExternalLogin) -> Result<(), DomainError>;
    async fn logins(&self, user_id: &Uuid) -> Result<Vec<ExternalLogin>, DomainError>;
}
