//! Telemetry setup

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AppEnvironment;

/// Installs the global subscriber. Development logs are human readable,
/// every other environment logs JSON.
pub fn init_telemetry(environment: AppEnvironment) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,identity_web=debug,identity_api=debug"));
    let registry = tracing_subscriber::registry().with(env_filter);

    if environment.is_development() {
        registry.with(fmt::layer().with_target(true)).init();
    } else {
        registry
            .with(fmt::layer().json().with_target(true).with_current_span(false))
            .init();
    }
}
