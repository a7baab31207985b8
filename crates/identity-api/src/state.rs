use std::sync::Arc;

use identity_core::repositories::{AccountRepository, RoleRepository};
use identity_core::services::AccountService;
use identity_infrastructure::IdentityDbContext;
use identity_shared::config::AppConfig;

use crate::providers::ExternalLoginProviders;

pub type SharedAccountService = Arc<AccountService<dyn AccountRepository, dyn RoleRepository>>;

#[derive(Clone)]
pub struct AppState {
    pub db: IdentityDbContext,
    pub accounts: SharedAccountService,
    pub providers: Arc<ExternalLoginProviders>,
    pub config: Arc<AppConfig>,
}
