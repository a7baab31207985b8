// ============================================================================
// Identity API - Account Handlers
// File: crates/identity-api/src/handlers/account.rs
// ============================================================================
//! Register, confirm email, login and logout

use axum::{
    extract::{Query, State},
    Form, Json,
};
use identity_core::domain::{FieldViolation, ProfileUpdate, RegisterInput, ValidationRule};
use identity_core::services::AccountProfile;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extractors::CurrentAccount;
use crate::providers::ProviderSummary;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Register form payload. Missing fields reach validation as blanks.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    /// `dd/MM/yyyy` or `yyyy-MM-dd`
    pub birthday: Option<String>,
}

impl From<RegisterForm> for RegisterInput {
    fn from(form: RegisterForm) -> Self {
        RegisterInput {
            email: form.email,
            password: form.password,
            confirm_password: form.confirm_password,
            profile: ProfileUpdate {
                first_name: form.first_name,
                last_name: form.last_name,
                phone_number: form.phone_number,
                birthday: form.birthday,
            },
        }
    }
}

/// Register success response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub account: AccountProfile,
    pub requires_confirmation: bool,
    pub confirmation_url: String,
    pub message: String,
}

/// Register handler - POST /Identity/Account/Register
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Json<ApiResponse<RegisterResponse>>, ApiError> {
    let result = state.accounts.register(form.into()).await?;

    let confirmation_url = format!(
        "/Identity/Account/ConfirmEmail?userId={}&code={}",
        result.account.id, result.confirmation_code
    );
    let message = if result.requires_confirmation {
        "Please check your email to confirm your account."
    } else {
        "Registration successful."
    };

    Ok(Json(ApiResponse::success(RegisterResponse {
        account: result.account,
        requires_confirmation: result.requires_confirmation,
        confirmation_url,
        message: message.to_string(),
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmEmailQuery {
    pub user_id: Option<Uuid>,
    pub code: Option<String>,
}

/// Confirm email handler - GET /Identity/Account/ConfirmEmail
pub async fn confirm_email(
    State(state): State<AppState>,
    Query(query): Query<ConfirmEmailQuery>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let (Some(user_id), Some(code)) = (query.user_id, query.code) else {
        return Err(ApiError::BadRequest("userId and code are required".to_string()));
    };

    state.accounts.confirm_email(&user_id, &code).await?;
    Ok(Json(ApiResponse::success("Thank you for confirming your email.".to_string())))
}

#[derive(Debug, Serialize)]
pub struct LoginPageResponse {
    pub external_logins: Vec<ProviderSummary>,
}

/// Login page - GET /Identity/Account/Login
pub async fn login_page(State(state): State<AppState>) -> Json<ApiResponse<LoginPageResponse>> {
    Json(ApiResponse::success(LoginPageResponse {
        external_logins: state.providers.summaries(),
    }))
}

/// Login form payload
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub account: AccountProfile,
    pub access_token: String,
    pub token_type: String,
}

/// Login handler - POST /Identity/Account/Login
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let mut missing = Vec::new();
    if form.email.trim().is_empty() {
        missing.push(required("email"));
    }
    if form.password.is_empty() {
        missing.push(required("password"));
    }
    if !missing.is_empty() {
        return Err(ApiError::Validation(missing));
    }

    let signed_in = state.accounts.sign_in(&form.email, &form.password).await?;
    tracing::debug!("Sign-in completed (remember me: {})", form.remember_me);

    Ok(Json(ApiResponse::success(LoginResponse {
        account: signed_in.account,
        access_token: signed_in.access_token,
        token_type: "Bearer".to_string(),
    })))
}

fn required(field: &str) -> FieldViolation {
    let violation = FieldViolation::new(field, ValidationRule::Required, "");
    let message = format!("The {} field is required.", violation.field);
    FieldViolation { message, ..violation }
}

/// Logout handler - POST /Identity/Account/Logout
pub async fn logout(
    State(state): State<AppState>,
    CurrentAccount(account): CurrentAccount,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    state.accounts.sign_out(&account.id()).await?;
    Ok(Json(ApiResponse::success("You have been logged out.".to_string())))
}
