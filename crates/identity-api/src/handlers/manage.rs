// ============================================================================
// Identity API - Manage Account Handlers
// File: crates/identity-api/src/handlers/manage.rs
// ============================================================================
//! Profile and personal data of the signed-in account

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Form, Json,
};
use identity_core::domain::{PersonalDataEntry, ProfileUpdate};
use identity_core::services::AccountProfile;
use identity_shared::constants::PERSONAL_DATA_FILE_NAME;
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};

use crate::error::ApiError;
use crate::extractors::CurrentAccount;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /Identity/Account/Manage
pub async fn profile(CurrentAccount(account): CurrentAccount) -> Json<ApiResponse<AccountProfile>> {
    Json(ApiResponse::success(AccountProfile::from(&account)))
}

/// POST /Identity/Account/Manage
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentAccount(account): CurrentAccount,
    Form(update): Form<ProfileUpdate>,
) -> Result<Json<ApiResponse<AccountProfile>>, ApiError> {
    let profile = state.accounts.update_profile(&account.id(), update).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// JSON object of the exported values, keys kept in export order
struct PersonalDataDocument<'a>(&'a [PersonalDataEntry]);

impl Serialize for PersonalDataDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in self.0 {
            map.serialize_entry(&entry.key, &entry.value)?;
        }
        map.end()
    }
}

/// POST /Identity/Account/Manage/DownloadPersonalData
pub async fn download_personal_data(
    State(state): State<AppState>,
    CurrentAccount(account): CurrentAccount,
) -> Result<Response, ApiError> {
    let entries = state.accounts.personal_data(&account.id()).await?;

    let body = serde_json::to_vec_pretty(&PersonalDataDocument(&entries))
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", PERSONAL_DATA_FILE_NAME),
            ),
        ],
        body,
    )
        .into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct DeletePersonalDataForm {
    pub password: Option<String>,
}

/// POST /Identity/Account/Manage/DeletePersonalData
pub async fn delete_personal_data(
    State(state): State<AppState>,
    CurrentAccount(account): CurrentAccount,
    Form(form): Form<DeletePersonalDataForm>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    state
        .accounts
        .delete_personal_data(&account.id(), form.password.as_deref())
        .await?;
    Ok(Json(ApiResponse::success("Your account has been deleted.".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use identity_core::domain::Account;

    #[test]
    fn test_personal_data_document_keeps_export_order() {
        let entries = Account::new("ana.silva@example.com").personal_data();
        let json = serde_json::to_string(&PersonalDataDocument(&entries)).unwrap();

        let positions: Vec<usize> = ["\"Id\"", "\"UserName\"", "\"Email\"", "\"PhoneNumber\"", "\"Birthday\""]
            .iter()
            .map(|key| json.find(key).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(json.contains("\"Birthday\":\"null\""));
    }
}
