// ============================================================================
// Identity Core - Identity User
// File: crates/identity-core/src/domain/identity_user.rs
// Description: Base account fields owned by the identity layer
// ============================================================================

use chrono::{DateTime, Utc};
use identity_security::{generate_security_stamp, new_concurrency_stamp};
use identity_shared::{new_id, utils::normalize_key};
use serde::Serialize;
use uuid::Uuid;

/// Generic identity record. Extended entities embed it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentityUser {
    pub id: Uuid,
    pub user_name: String,
    pub normalized_user_name: String,
    pub email: String,
    pub normalized_email: String,
    pub email_confirmed: bool,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    #[serde(skip_serializing)]
    pub security_stamp: String,
    pub concurrency_stamp: String,
    pub phone_number_confirmed: bool,
    pub two_factor_enabled: bool,
    pub lockout_end: Option<DateTime<Utc>>,
    pub lockout_enabled: bool,
    pub access_failed_count: i32,
}

impl IdentityUser {
    /// New record whose user name is its email.
    pub fn new(email: &str) -> Self {
        let email = email.trim().to_string();
        Self {
            id: new_id(),
            user_name: email.clone(),
            normalized_user_name: normalize_key(&email),
            normalized_email: normalize_key(&email),
            email,
            email_confirmed: false,
            password_hash: None,
            security_stamp: generate_security_stamp(),
            concurrency_stamp: new_concurrency_stamp(),
            phone_number_confirmed: false,
            two_factor_enabled: false,
            lockout_end: None,
            lockout_enabled: true,
            access_failed_count: 0,
        }
    }

    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    pub fn is_locked_out(&self, now: DateTime<Utc>) -> bool {
        self.lockout_enabled && self.lockout_end.is_some_and(|end| end > now)
    }

    /// Counts a failed password check; locks the account once `max_attempts`
    /// is reached and starts counting again from zero.
    pub fn record_access_failure(&mut self, now: DateTime<Utc>, max_attempts: i32, lockout: chrono::Duration) {
        if !self.lockout_enabled {
            return;
        }
        self.access_failed_count += 1;
        if self.access_failed_count >= max_attempts {
            self.lockout_end = Some(now + lockout);
            self.access_failed_count = 0;
        }
    }

    pub fn reset_access_failures(&mut self) {
        self.access_failed_count = 0;
        self.lockout_end = None;
    }

    /// Swaps in a fresh concurrency stamp and returns the previous one.
    pub fn rotate_concurrency_stamp(&mut self) -> String {
        std::mem::replace(&mut self.concurrency_stamp, new_concurrency_stamp())
    }

    pub fn rotate_security_stamp(&mut self) {
        self.security_stamp = generate_security_stamp();
    }
}
