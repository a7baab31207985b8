//! Database connection pool

use std::str::FromStr;
use std::time::Duration;

use identity_shared::config::DatabaseSettings;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::debug;

/// Opens a pool for a `sqlite:` connection string, creating the file if
/// needed. In-memory databases live in a single connection that is never
/// recycled.
pub async fn create_pool(url: &str, settings: &DatabaseSettings) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = SqlitePoolOptions::new()
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_seconds));

    let pool_options = if is_in_memory(url) {
        pool_options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        pool_options.max_connections(settings.max_connections)
    };

    debug!("Opening SQLite pool (in memory: {})", is_in_memory(url));
    pool_options.connect_with(options).await
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
