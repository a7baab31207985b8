//! Development-only endpoint applying pending migrations

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MigrationsResponse {
    pub applied: usize,
}

/// POST /ApplyDatabaseMigrations
pub async fn apply_migrations(State(state): State<AppState>) -> Result<Json<ApiResponse<MigrationsResponse>>, ApiError> {
    info!("Applying database migrations on request");
    let applied = state
        .db
        .migrate()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
    Ok(Json(ApiResponse::success(MigrationsResponse { applied })))
}
