// ============================================================================
// Identity Web - Startup
// File: identity-client-app/identity-web/src/startup.rs
// ============================================================================
//! Composes the host: connection string, persistence, migrations, identity
//! services, external providers and the middleware chain.

use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{http::header::InvalidHeaderValue, middleware, Router};
use chrono::Duration;
use identity_api::middleware::{hsts_layer, https_redirect, production_error_handler};
use identity_api::providers::ProviderError;
use identity_api::routes::migrations_endpoint;
use identity_api::{identity_routes, AppState, ExternalLoginProviders};
use identity_core::repositories::{AccountRepository, RoleRepository};
use identity_core::services::{AccountService, IdentityOptions};
use identity_infrastructure::{create_pool, IdentityDbContext, InfrastructureError};
use identity_security::{PasswordPolicy, TokenService};
use identity_shared::{AppConfig, AppError};
use thiserror::Error;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Connection string '{0}' not found.")]
    MissingConnectionString(String),

    #[error("Configuration error: {0}")]
    Config(AppError),

    #[error("Insecure signing key: {0}")]
    InsecureSigningKey(AppError),

    #[error(transparent)]
    Database(#[from] InfrastructureError),

    #[error("External login provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Invalid HSTS header: {0}")]
    Header(#[from] InvalidHeaderValue),

    #[error("Invalid listen address: {0}")]
    Address(#[from] AddrParseError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<AppError> for StartupError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::MissingConnectionString(name) => StartupError::MissingConnectionString(name),
            err @ AppError::InsecureSigningKey => StartupError::InsecureSigningKey(err),
            other => StartupError::Config(other),
        }
    }
}

/// Validated configuration, ready to build the application.
pub struct Startup {
    config: AppConfig,
    connection_string: String,
    signing_secret: String,
}

impl Startup {
    /// Resolves `DefaultConnection` and the signing key before anything else
    /// is touched.
    pub fn from_config(config: AppConfig) -> Result<Self, StartupError> {
        let connection_string = config.default_connection()?.to_string();
        let signing_secret = config.signing_secret()?.to_string();
        Ok(Self {
            config,
            connection_string,
            signing_secret,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn build(self) -> Result<Application, StartupError> {
        let config = Arc::new(self.config);

        // 1. Persistence
        let pool = create_pool(&self.connection_string, &config.database)
            .await
            .map_err(InfrastructureError::from)?;
        let db = IdentityDbContext::new(pool);
        info!("Database connection established.");

        // 2. Pending migrations, before any request is served
        db.migrate().await?;

        // 3. Identity services over the account store
        let accounts: Arc<dyn AccountRepository> = db.accounts();
        let roles: Arc<dyn RoleRepository> = db.roles();
        let tokens = TokenService::new(
            self.signing_secret,
            config.jwt.access_token_expiry,
            config.jwt.confirmation_token_expiry,
        );
        let options = IdentityOptions {
            require_confirmed_account: config.identity.require_confirmed_account,
            max_failed_access_attempts: config.identity.max_failed_access_attempts,
            lockout: Duration::minutes(config.identity.lockout_minutes),
            password: PasswordPolicy::default(),
        };
        let account_service = Arc::new(AccountService::new(accounts, roles, tokens, options));

        // 4. External login providers
        let providers = Arc::new(ExternalLoginProviders::from_settings(&config.authentication)?);

        let state = AppState {
            db,
            accounts: account_service,
            providers,
            config: config.clone(),
        };

        let router = build_router(state, &config)?;
        Ok(Application { router, config })
    }
}

/// Routes wrapped in the request pipeline for the configured environment.
fn build_router(state: AppState, config: &AppConfig) -> Result<Router, StartupError> {
    let environment = config.app.env;

    let mut routes = identity_routes();
    if environment.is_development() {
        routes = routes.merge(migrations_endpoint());
    }

    let mut router = routes
        .fallback_service(ServeDir::new(&config.app.static_dir))
        .with_state(state)
        .layer(CatchPanicLayer::new());

    if !environment.is_development() {
        router = router
            .layer(middleware::from_fn(production_error_handler))
            .layer(hsts_layer(config.app.hsts_max_age_days)?);
    }

    match config.app.https_port {
        Some(port) => {
            router = router.layer(middleware::from_fn_with_state(port, https_redirect));
        }
        None => warn!("Failed to determine the https port for redirect."),
    }

    Ok(router
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new().include_headers(false)))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid)))
}

pub struct Application {
    router: Router,
    config: Arc<AppConfig>,
}

impl Application {
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn run(self) -> Result<(), StartupError> {
        let host: IpAddr = self.config.app.host.parse()?;
        let addr = SocketAddr::from((host, self.config.app.port));

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Now listening on: http://{}", addr);
        info!("Hosting environment: {}", self.config.app.env.as_str());

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Application is shutting down...");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
