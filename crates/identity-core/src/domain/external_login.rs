//! Link between an account and an external OAuth provider identity

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalLogin {
    pub login_provider: String,
    pub provider_key: String,
    pub provider_display_name: Option<String>,
    pub user_id: Uuid,
}

impl ExternalLogin {
    pub fn new(login_provider: &str, provider_key: &str, user_id: Uuid) -> Self {
        Self {
            login_provider: login_provider.to_string(),
            provider_key: provider_key.to_string(),
            provider_display_name: Some(login_provider.to_string()),
            user_id,
        }
    }

    /// Export key used for the personal data download.
    pub fn personal_data_key(&self) -> String {
        format!("{} external login provider key", self.login_provider)
    }
}
