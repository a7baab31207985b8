//! External login providers registered from configuration

use identity_shared::config::{AuthenticationSettings, ExternalProviderSettings};
use identity_shared::constants::MICROSOFT_PROVIDER;
use oauth2::{AuthUrl, ClientId, ClientSecret, TokenUrl};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

const MICROSOFT_AUTH_URL: &str = "https://login.microsoftonline.com/common/oauth2/v2.0/authorize";
const MICROSOFT_TOKEN_URL: &str = "https://login.microsoftonline.com/common/oauth2/v2.0/token";

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Invalid endpoint for {provider}: {source}")]
    InvalidEndpoint {
        provider: String,
        source: oauth2::url::ParseError,
    },
}

/// One OAuth provider users can sign in with
#[derive(Debug, Clone)]
pub struct ExternalLoginProvider {
    pub name: String,
    pub display_name: String,
    pub client_id: ClientId,
    pub client_secret: ClientSecret,
    pub auth_url: AuthUrl,
    pub token_url: TokenUrl,
}

impl ExternalLoginProvider {
    /// Microsoft account provider. `None` when the client id or secret is
    /// not configured.
    pub fn microsoft(settings: &ExternalProviderSettings) -> Result<Option<Self>, ProviderError> {
        let (Some(client_id), Some(client_secret)) = (
            non_blank(settings.client_id.as_deref()),
            non_blank(settings.client_secret.as_deref()),
        ) else {
            return Ok(None);
        };

        let endpoint_error = |source| ProviderError::InvalidEndpoint {
            provider: MICROSOFT_PROVIDER.to_string(),
            source,
        };

        Ok(Some(Self {
            name: MICROSOFT_PROVIDER.to_string(),
            display_name: "Microsoft Account".to_string(),
            client_id: ClientId::new(client_id.to_string()),
            client_secret: ClientSecret::new(client_secret.to_string()),
            auth_url: AuthUrl::new(MICROSOFT_AUTH_URL.to_string()).map_err(endpoint_error)?,
            token_url: TokenUrl::new(MICROSOFT_TOKEN_URL.to_string()).map_err(endpoint_error)?,
        }))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// What the login page shows for a provider
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSummary {
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct ExternalLoginProviders {
    providers: Vec<ExternalLoginProvider>,
}

impl ExternalLoginProviders {
    pub fn from_settings(settings: &AuthenticationSettings) -> Result<Self, ProviderError> {
        let mut providers = Vec::new();

        match settings.microsoft.as_ref().map(ExternalLoginProvider::microsoft).transpose()?.flatten() {
            Some(provider) => {
                info!("External login provider registered: {}", provider.name);
                providers.push(provider);
            }
            None => warn!(
                "{} login is not configured (authentication.microsoft.client_id / client_secret); provider skipped",
                MICROSOFT_PROVIDER
            ),
        }

        Ok(Self { providers })
    }

    pub fn get(&self, name: &str) -> Option<&ExternalLoginProvider> {
        self.providers
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn summaries(&self) -> Vec<ProviderSummary> {
        self.providers
            .iter()
            .map(|p| ProviderSummary {
                name: p.name.clone(),
                display_name: p.display_name.clone(),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
