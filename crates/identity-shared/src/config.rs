//! Configuration management

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_ACCESS_TOKEN_EXPIRY, DEFAULT_CONFIRMATION_TOKEN_EXPIRY, DEFAULT_CONNECTION_NAME,
    DEFAULT_LOCKOUT_MINUTES, DEFAULT_MAX_FAILED_ACCESS_ATTEMPTS, DEVELOPMENT_SIGNING_KEY,
};
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub connection_strings: ConnectionStrings,
    pub jwt: JwtSettings,
    pub identity: IdentitySettings,
    #[serde(default)]
    pub authentication: AuthenticationSettings,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Staging,
    Production,
}

impl AppEnvironment {
    pub fn is_development(&self) -> bool {
        matches!(self, AppEnvironment::Development)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Staging => "staging",
            AppEnvironment::Production => "production",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: AppEnvironment,
    pub host: String,
    pub port: u16,
    pub name: String,
    /// Port HTTP requests are redirected to. Without it no redirect happens.
    pub https_port: Option<u16>,
    pub static_dir: String,
    pub hsts_max_age_days: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConnectionStrings {
    pub default_connection: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_expiry: i64,
    pub confirmation_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IdentitySettings {
    pub require_confirmed_account: bool,
    pub max_failed_access_attempts: i32,
    pub lockout_minutes: i64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthenticationSettings {
    pub microsoft: Option<ExternalProviderSettings>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExternalProviderSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl AppConfig {
    /// Loads `.env`, defaults, `config/default`, `config/{APP_ENV}` and the
    /// process environment, in that order of precedence.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let builder = Self::defaults()?
            .set_default("app.env", env.clone())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::default().separator("__").try_parsing(true));

        Self::from_builder(builder)
    }

    /// Builder pre-populated with every default except the connection string.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 5000)?
            .set_default("app.name", "identity-web")?
            .set_default("app.static_dir", "wwwroot")?
            .set_default("app.hsts_max_age_days", 30)?
            .set_default("database.max_connections", 5)?
            .set_default("database.acquire_timeout_seconds", 3)?
            .set_default("jwt.secret", DEVELOPMENT_SIGNING_KEY)?
            .set_default("jwt.access_token_expiry", DEFAULT_ACCESS_TOKEN_EXPIRY)?
            .set_default("jwt.confirmation_token_expiry", DEFAULT_CONFIRMATION_TOKEN_EXPIRY)?
            .set_default("identity.require_confirmed_account", true)?
            .set_default("identity.max_failed_access_attempts", DEFAULT_MAX_FAILED_ACCESS_ATTEMPTS)?
            .set_default("identity.lockout_minutes", DEFAULT_LOCKOUT_MINUTES)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, AppError> {
        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// The `DefaultConnection` connection string. Absent or blank is an error.
    pub fn default_connection(&self) -> Result<&str, AppError> {
        self.connection_strings
            .default_connection
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::MissingConnectionString(DEFAULT_CONNECTION_NAME.to_string()))
    }

    /// The token signing key. Outside development it must be set and differ
    /// from the built-in development key.
    pub fn signing_secret(&self) -> Result<&str, AppError> {
        let secret = self.jwt.secret.trim();
        let insecure = secret.is_empty() || secret == DEVELOPMENT_SIGNING_KEY;
        if insecure && !self.app.env.is_development() {
            return Err(AppError::InsecureSigningKey);
        }
        Ok(secret)
    }
}
