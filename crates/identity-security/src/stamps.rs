//! Security and concurrency stamps

use rand::Rng;
use uuid::Uuid;

/// Random value that invalidates every issued token once it changes.
pub fn generate_security_stamp() -> String {
    let stamp: [u8; 20] = rand::rng().random();
    hex::encode_upper(stamp)
}

/// Value rewritten on every persisted change of an account.
pub fn new_concurrency_stamp() -> String {
    Uuid::new_v4().to_string()
}
