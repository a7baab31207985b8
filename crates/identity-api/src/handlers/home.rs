//! Default `{controller=Home}/{action=Index}/{id?}` routes

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;

use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PageResponse {
    pub page: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorPageResponse {
    pub request_id: Option<String>,
    pub show_request_id: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_hint: Option<String>,
}

pub async fn index(State(state): State<AppState>) -> Json<ApiResponse<PageResponse>> {
    Json(ApiResponse::success(PageResponse {
        page: "Home/Index".to_string(),
        title: state.config.app.name.clone(),
        id: None,
    }))
}

pub async fn index_with_id(State(state): State<AppState>, Path(id): Path<String>) -> Json<ApiResponse<PageResponse>> {
    Json(ApiResponse::success(PageResponse {
        page: "Home/Index".to_string(),
        title: state.config.app.name.clone(),
        id: Some(id),
    }))
}

pub async fn privacy() -> Json<ApiResponse<PageResponse>> {
    Json(ApiResponse::success(PageResponse {
        page: "Home/Privacy".to_string(),
        title: "Privacy Policy".to_string(),
        id: None,
    }))
}

/// Generic error page. Only the request id is disclosed.
pub async fn error(State(state): State<AppState>, headers: HeaderMap) -> Json<ApiResponse<ErrorPageResponse>> {
    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let environment_hint = (!state.config.app.env.is_development()).then(|| {
        "Swapping to the development environment displays detailed information about the error that occurred."
            .to_string()
    });

    Json(ApiResponse::success(ErrorPageResponse {
        show_request_id: request_id.is_some(),
        request_id,
        environment_hint,
    }))
}
