//! Role store trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::Role;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find_by_normalized_name(&self, normalized_name: &str) -> Result<Option<Role>, DomainError>;
    async fn create(&self, role: &Role) -> Result<Role, DomainError>;
    async fn add_user_to_role(&self, user_id: &Uuid, role_id: &Uuid) -> Result<(), DomainError>;
    async fn roles_for_user(&self, user_id: &Uuid) -> Result<Vec<String>, DomainError>;
}
