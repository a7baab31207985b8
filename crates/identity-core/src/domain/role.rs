//! Role entity

use identity_security::new_concurrency_stamp;
use identity_shared::{new_id, utils::normalize_key};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub normalized_name: String,
    pub concurrency_stamp: String,
}

impl Role {
    pub fn new(name: &str) -> Self {
        let name = name.trim().to_string();
        Self {
            id: new_id(),
            normalized_name: normalize_key(&name),
            name,
            concurrency_stamp: new_concurrency_stamp(),
        }
    }
}
