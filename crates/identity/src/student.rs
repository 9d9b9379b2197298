use serde::{Deserialize, Serialize};

use registrar_auth::Role;
use registrar_core::{DomainError, DomainResult, StudentId};

/// A student identity record.
///
/// The registration number doubles as a login alias next to the username.
/// `enrollment_date` is kept as a free-form string; upstream systems supply
/// it in several formats and nothing here computes with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: StudentId,
    pub name: String,
    pub reg_number: String,
    pub index_number: Option<String>,
    pub academic_year: Option<String>,
    pub enrollment_date: Option<String>,
    pub username: String,
    pub password_hash: String,
    pub faculty: String,
    pub department: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub nic: Option<String>,
    pub mobile: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub birthdate: Option<String>,
    pub level: Option<String>,
}

/// Signup input for a new student account.
///
/// The password travels in plaintext only this far; the resolver hashes it
/// before a [`StudentRecord`] is ever constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub reg_number: String,
    pub name: String,
    pub enrollment_date: Option<String>,
    pub index_number: Option<String>,
    pub academic_year: Option<String>,
    pub faculty: String,
    pub username: String,
    pub password: String,
}

impl NewStudent {
    /// Validate signup input before any store is touched.
    pub fn validate(&self) -> DomainResult<()> {
        if self.username.trim().is_empty() {
            return Err(DomainError::validation("username cannot be empty"));
        }
        if self.password.is_empty() {
            return Err(DomainError::validation("password cannot be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.reg_number.trim().is_empty() {
            return Err(DomainError::validation("regNumber cannot be empty"));
        }
        if self.faculty.trim().is_empty() {
            return Err(DomainError::validation("faculty cannot be empty"));
        }
        Ok(())
    }

    /// Materialize the stored record once the password has been hashed.
    pub fn into_record(self, password_hash: String) -> StudentRecord {
        StudentRecord {
            id: StudentId::new(),
            name: self.name.trim().to_string(),
            reg_number: self.reg_number.trim().to_string(),
            index_number: self.index_number,
            academic_year: self.academic_year,
            enrollment_date: self.enrollment_date,
            username: self.username.trim().to_string(),
            password_hash,
            faculty: self.faculty,
            department: None,
            email: None,
            role: None,
            nic: None,
            mobile: None,
            address: None,
            gender: None,
            birthdate: None,
            level: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_signup() -> NewStudent {
        NewStudent {
            reg_number: "2024/FAS/001".to_string(),
            name: "Alice Perera".to_string(),
            enrollment_date: Some("2024-01-15".to_string()),
            index_number: Some("AS2024001".to_string()),
            academic_year: Some("2024/2025".to_string()),
            faculty: "Applied Science".to_string(),
            username: "alice".to_string(),
            password: "password123".to_string(),
        }
    }

    #[test]
    fn valid_signup_passes() {
        assert!(valid_signup().validate().is_ok());
    }

    #[test]
    fn empty_username_rejected() {
        let mut signup = valid_signup();
        signup.username = "  ".to_string();
        let err = signup.validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("username")));
    }

    #[test]
    fn empty_password_rejected() {
        let mut signup = valid_signup();
        signup.password.clear();
        assert!(signup.validate().is_err());
    }

    #[test]
    fn into_record_trims_login_fields() {
        let mut signup = valid_signup();
        signup.username = " alice ".to_string();
        let record = signup.into_record("phc-hash".to_string());
        assert_eq!(record.username, "alice");
        assert_eq!(record.password_hash, "phc-hash");
        assert_eq!(record.role, None);
    }
}
