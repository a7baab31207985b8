// ============================================================================
// Identity API - Pipeline Middleware
// File: crates/identity-api/src/middleware.rs
// ============================================================================
//! HTTPS redirection, HSTS and the production error handler

use axum::{
    extract::{Request, State},
    http::{
        header::{InvalidHeaderValue, HOST, STRICT_TRANSPORT_SECURITY},
        uri::Authority,
        HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{debug, error};

use crate::handlers::home::ErrorPageResponse;
use crate::response::ApiResponse;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Redirects plain HTTP requests to `https://{host}:{https_port}`.
pub async fn https_redirect(State(https_port): State<u16>, request: Request, next: Next) -> Response {
    if is_https(&request) {
        return next.run(request).await;
    }

    let host = request.headers().get(HOST).and_then(|v| v.to_str().ok());
    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let location = redirect_location(host, https_port, path);
    debug!("Redirecting to {}", location);
    Redirect::temporary(&location).into_response()
}

/// `https://` target for a `Host` header value. IPv6 hosts keep their brackets.
fn redirect_location(host: Option<&str>, https_port: u16, path: &str) -> String {
    let host = host
        .and_then(|h| h.parse::<Authority>().ok())
        .map(|authority| authority.host().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string());
    let port = if https_port == 443 {
        String::new()
    } else {
        format!(":{}", https_port)
    };
    format!("https://{}{}{}", host, port, path)
}

fn is_https(request: &Request) -> bool {
    request.uri().scheme_str() == Some("https")
        || request
            .headers()
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|proto| proto.eq_ignore_ascii_case("https"))
}

/// `Strict-Transport-Security` on every response that lacks one
pub fn hsts_layer(max_age_days: u64) -> Result<SetResponseHeaderLayer<HeaderValue>, InvalidHeaderValue> {
    let value = HeaderValue::try_from(format!("max-age={}", max_age_days * SECONDS_PER_DAY))?;
    Ok(SetResponseHeaderLayer::if_not_present(STRICT_TRANSPORT_SECURITY, value))
}

/// Replaces server error bodies with the generic error page. Details stay
/// in the log.
pub async fn production_error_handler(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let path = request.uri().path().to_string();

    let response = next.run(request).await;
    let status = response.status();
    if !status.is_server_error() {
        return response;
    }

    error!(
        status = %status,
        path = %path,
        request_id = request_id.as_deref().unwrap_or("-"),
        "Request failed; generic error page returned"
    );

    let mut body = ApiResponse::<ErrorPageResponse>::error("SERVER_ERROR", "An error occurred while processing your request.");
    body.data = Some(ErrorPageResponse {
        show_request_id: request_id.is_some(),
        request_id,
        environment_hint: None,
    });
    (status, Json(body)).into_response()
}
