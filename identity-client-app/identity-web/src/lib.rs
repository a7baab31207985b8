//! # Identity Web
//!
//! Host composition for the identity web application.

pub mod startup;

pub use startup::{Application, Startup, StartupError};
