//! # Identity Security
//! 
//! Security utilities: password verifiers, password policy, tokens and stamps.

pub mod tokens;
pub mod password;
pub mod stamps;

pub use tokens::{TokenClaims, TokenError, TokenPurpose, TokenService};
pub use password::{PasswordError, PasswordPolicy, PasswordPolicyViolation, PasswordService};
pub use stamps::{generate_security_stamp, new_concurrency_stamp};
