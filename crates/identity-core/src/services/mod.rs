//! Identity services (business logic)

pub mod account_service;

pub use account_service::{AccountProfile, AccountService, IdentityOptions, RegisterResult, SignInResult};
