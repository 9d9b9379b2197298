use serde::{Deserialize, Serialize};

use registrar_auth::Role;
use registrar_core::StaffId;

/// A staff identity record.
///
/// The staff number (e.g. "STF001") doubles as a login alias next to the
/// username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffRecord {
    pub id: StaffId,
    pub name: String,
    pub staff_number: String,
    pub department: String,
    pub faculty: String,
    pub email: Option<String>,
    pub username: String,
    pub password_hash: String,
    pub role: Option<Role>,
}
