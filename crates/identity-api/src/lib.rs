//! # Identity API
//!
//! HTTP handlers, response envelope, request extractors, pipeline
//! middleware and the external login provider registry.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod providers;
pub mod response;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use providers::{ExternalLoginProvider, ExternalLoginProviders};
pub use response::ApiResponse;
pub use routes::identity_routes;
pub use state::{AppState, SharedAccountService};
