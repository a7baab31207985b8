//! # Identity Core
//! 
//! Account entity, validation, repository traits and identity services.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::DomainError;
