use serde::{Deserialize, Serialize};

use registrar_auth::Role;
use registrar_core::AdminId;

/// An administrator identity record.
///
/// Admins are few and flat: a login pair, an explicit role tag, and an
/// optional faculty scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRecord {
    pub id: AdminId,
    pub username: String,
    pub password_hash: String,
    pub role: Option<Role>,
    pub faculty: Option<String>,
}

impl AdminRecord {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: AdminId::new(),
            username: username.into(),
            password_hash: password_hash.into(),
            role: Some(Role::Admin),
            faculty: None,
        }
    }
}
