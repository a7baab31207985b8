//! Route table

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{account, health, home, manage, migrations};
use crate::state::AppState;

/// Default controller routes plus the identity area
pub fn identity_routes() -> Router<AppState> {
    Router::new()
        // {controller=Home}/{action=Index}/{id?}
        .route("/", get(home::index))
        .route("/Home", get(home::index))
        .route("/Home/Index", get(home::index))
        .route("/Home/Index/{id}", get(home::index_with_id))
        .route("/Home/Privacy", get(home::privacy))
        .route("/Home/Error", get(home::error))
        // Identity area
        .route("/Identity/Account/Register", post(account::register))
        .route("/Identity/Account/ConfirmEmail", get(account::confirm_email))
        .route("/Identity/Account/Login", get(account::login_page).post(account::login))
        .route("/Identity/Account/Logout", post(account::logout))
        .route("/Identity/Account/Manage", get(manage::profile).post(manage::update_profile))
        .route(
            "/Identity/Account/Manage/DownloadPersonalData",
            post(manage::download_personal_data),
        )
        .route(
            "/Identity/Account/Manage/DeletePersonalData",
            post(manage::delete_personal_data),
        )
        .route("/health", get(health::health_check))
}

/// Development only
pub fn migrations_endpoint() -> Router<AppState> {
    Router::new().route("/ApplyDatabaseMigrations", post(migrations::apply_migrations))
}
