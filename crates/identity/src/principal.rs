use uuid::Uuid;

use registrar_auth::Role;

use crate::{AdminRecord, StaffRecord, StudentRecord};

/// Any authenticated identity, resolved from one of the three collections.
///
/// The variants keep their full records; this interface narrows them to the
/// fields credential resolution and token issuance care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Admin(AdminRecord),
    Student(StudentRecord),
    Staff(StaffRecord),
}

impl Principal {
    pub fn id(&self) -> Uuid {
        match self {
            Principal::Admin(a) => *a.id.as_uuid(),
            Principal::Student(s) => *s.id.as_uuid(),
            Principal::Staff(s) => *s.id.as_uuid(),
        }
    }

    pub fn username(&self) -> &str {
        match self {
            Principal::Admin(a) => &a.username,
            Principal::Student(s) => &s.username,
            Principal::Staff(s) => &s.username,
        }
    }

    pub fn password_hash(&self) -> &str {
        match self {
            Principal::Admin(a) => &a.password_hash,
            Principal::Student(s) => &s.password_hash,
            Principal::Staff(s) => &s.password_hash,
        }
    }

    /// The record's explicit role tag, or the collection's implicit role.
    pub fn role(&self) -> Role {
        match self {
            Principal::Admin(a) => a.role.unwrap_or(Role::Admin),
            Principal::Student(s) => s.role.unwrap_or(Role::Student),
            Principal::Staff(s) => s.role.unwrap_or(Role::Staff),
        }
    }

    pub fn faculty(&self) -> Option<&str> {
        match self {
            Principal::Admin(a) => a.faculty.as_deref(),
            Principal::Student(s) => Some(s.faculty.as_str()),
            Principal::Staff(s) => Some(s.faculty.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registrar_core::StaffId;

    fn staff_without_role() -> StaffRecord {
        StaffRecord {
            id: StaffId::new(),
            name: "Dr. Alice Smith".to_string(),
            staff_number: "STF001".to_string(),
            department: "Information and Communication Technology".to_string(),
            faculty: "Applied Science".to_string(),
            email: Some("alice@univ.edu".to_string()),
            username: "Staff/fas/01".to_string(),
            password_hash: "phc".to_string(),
            role: None,
        }
    }

    #[test]
    fn role_falls_back_to_collection_default() {
        let principal = Principal::Staff(staff_without_role());
        assert_eq!(principal.role(), Role::Staff);
    }

    #[test]
    fn explicit_role_wins_over_default() {
        let mut staff = staff_without_role();
        staff.role = Some(Role::Admin);
        assert_eq!(Principal::Staff(staff).role(), Role::Admin);
    }

    #[test]
    fn admin_faculty_may_be_absent() {
        let principal = Principal::Admin(AdminRecord::new("admin", "phc"));
        assert_eq!(principal.faculty(), None);
        assert_eq!(principal.role(), Role::Admin);
    }
}
