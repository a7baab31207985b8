//! Password verifiers (Argon2) and password policy

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use identity_shared::constants::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Hash error: {0}")]
    HashError(String),
}

pub struct PasswordService;

impl PasswordService {
    pub fn hash(password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| PasswordError::HashError(e.to_string()))
    }

    pub fn verify(password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| PasswordError::HashError(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicyViolation {
    TooShort { min: usize },
    TooLong { max: usize },
    RequiresDigit,
    RequiresLower,
    RequiresUpper,
    RequiresNonAlphanumeric,
}

impl PasswordPolicyViolation {
    pub fn code(&self) -> &'static str {
        match self {
            PasswordPolicyViolation::TooShort { .. } => "PasswordTooShort",
            PasswordPolicyViolation::TooLong { .. } => "PasswordTooLong",
            PasswordPolicyViolation::RequiresDigit => "PasswordRequiresDigit",
            PasswordPolicyViolation::RequiresLower => "PasswordRequiresLower",
            PasswordPolicyViolation::RequiresUpper => "PasswordRequiresUpper",
            PasswordPolicyViolation::RequiresNonAlphanumeric => "PasswordRequiresNonAlphanumeric",
        }
    }

    pub fn description(&self) -> String {
        match self {
            PasswordPolicyViolation::TooShort { min } => {
                format!("Passwords must be at least {} characters.", min)
            }
            PasswordPolicyViolation::TooLong { max } => {
                format!("Passwords must be at most {} characters.", max)
            }
            PasswordPolicyViolation::RequiresDigit => {
                "Passwords must have at least one digit ('0'-'9').".to_string()
            }
            PasswordPolicyViolation::RequiresLower => {
                "Passwords must have at least one lowercase ('a'-'z').".to_string()
            }
            PasswordPolicyViolation::RequiresUpper => {
                "Passwords must have at least one uppercase ('A'-'Z').".to_string()
            }
            PasswordPolicyViolation::RequiresNonAlphanumeric => {
                "Passwords must have at least one non alphanumeric character.".to_string()
            }
        }
    }
}

/// Default identity password rules.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_non_alphanumeric: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
            max_length: MAX_PASSWORD_LENGTH,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
        }
    }
}

impl PasswordPolicy {
    /// Every rule the password breaks; empty when it is acceptable.
    pub fn check(&self, password: &str) -> Vec<PasswordPolicyViolation> {
        let mut violations = Vec::new();
        let length = password.chars().count();

        if length < self.min_length {
            violations.push(PasswordPolicyViolation::TooShort { min: self.min_length });
        }
        if length > self.max_length {
            violations.push(PasswordPolicyViolation::TooLong { max: self.max_length });
        }
        if self.require_non_alphanumeric && password.chars().all(|c| c.is_ascii_alphanumeric()) {
            violations.push(PasswordPolicyViolation::RequiresNonAlphanumeric);
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            violations.push(PasswordPolicyViolation::RequiresDigit);
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            violations.push(PasswordPolicyViolation::RequiresLower);
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            violations.push(PasswordPolicyViolation::RequiresUpper);
        }

        violations
    }
}
