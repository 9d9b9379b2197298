//! Credential resolution: the ordered, cross-collection identity lookup and
//! token issuance behind login, signup, and password change.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use registrar_auth::{
    HashError, Role, SessionClaims, TokenError, TokenIssuer, hash_password, verify_password,
};
use registrar_core::{AdminId, DomainError, StaffId, StudentId};
use registrar_identity::{NewStudent, Principal};

use crate::store::{AdminStore, StaffStore, StoreError, StudentStore};

/// Authentication-path error.
///
/// `PrincipalNotFound` and `InvalidCredentials` stay distinct internally (and
/// in logs) but must surface as one generic message at the HTTP boundary to
/// limit username enumeration.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user not found")]
    PrincipalNotFound,

    #[error("invalid password")]
    InvalidCredentials,

    #[error("username already exists")]
    DuplicateUsername,

    #[error("invalid current password")]
    InvalidCurrentPassword,

    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Hash(#[from] HashError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A successful login: the opaque token plus the claims it was minted from
/// (for building the response body without re-decoding).
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub claims: SessionClaims,
}

/// Ordered, cross-collection identity lookup and token issuance.
///
/// The collections are searched in a fixed order: admins (when the attempt
/// looks administrative), then students, then staff. The first collection
/// that yields a record wins. Usernames are only unique within a collection,
/// so this order *is* the tie-break for cross-collection collisions.
pub struct CredentialResolver {
    admins: Arc<dyn AdminStore>,
    students: Arc<dyn StudentStore>,
    staff: Arc<dyn StaffStore>,
    tokens: Arc<dyn TokenIssuer>,
}

impl CredentialResolver {
    pub fn new(
        admins: Arc<dyn AdminStore>,
        students: Arc<dyn StudentStore>,
        staff: Arc<dyn StaffStore>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            admins,
            students,
            staff,
            tokens,
        }
    }

    /// Resolve a login attempt and issue a session token.
    ///
    /// The admin collection is only consulted when no faculty hint was given
    /// or the username is literally "admin"; students may log in by username
    /// or registration number, staff by username or staff number.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        faculty_hint: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<LoginOutcome, AuthError> {
        let principal = match self.locate(username, faculty_hint).await? {
            Some(principal) => principal,
            None => {
                tracing::debug!(username, "login failed: no matching principal");
                return Err(AuthError::PrincipalNotFound);
            }
        };

        if !verify_password(principal.password_hash(), password) {
            tracing::debug!(username, "login failed: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let claims = SessionClaims::new(
            principal.id().to_string(),
            principal.username(),
            principal.role(),
            principal.faculty(),
            now,
        );
        let token = self.tokens.issue(&claims)?;

        tracing::info!(username = %claims.username, role = %claims.role, "login succeeded");
        Ok(LoginOutcome { token, claims })
    }

    async fn locate(
        &self,
        username: &str,
        faculty_hint: Option<&str>,
    ) -> Result<Option<Principal>, AuthError> {
        if faculty_hint.is_none() || username == "admin" {
            if let Some(admin) = self.admins.find_by_username(username).await? {
                return Ok(Some(Principal::Admin(admin)));
            }
        }
        if let Some(student) = self.students.find_by_login(username).await? {
            return Ok(Some(Principal::Student(student)));
        }
        if let Some(staff) = self.staff.find_by_login(username).await? {
            return Ok(Some(Principal::Staff(staff)));
        }
        Ok(None)
    }

    /// Create a new student account.
    ///
    /// The collision check runs against the student collection only; the
    /// store's own uniqueness constraint backs it up under concurrency.
    pub async fn signup(&self, signup: NewStudent) -> Result<StudentId, AuthError> {
        signup.validate()?;

        if self
            .students
            .find_by_username(&signup.username)
            .await?
            .is_some()
        {
            return Err(AuthError::DuplicateUsername);
        }

        let password_hash = hash_password(&signup.password)?;
        let record = signup.into_record(password_hash);
        let id = record.id;

        match self.students.insert(record).await {
            Ok(()) => Ok(id),
            Err(StoreError::Duplicate(_)) => Err(AuthError::DuplicateUsername),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace a principal's password after re-verifying the current one.
    ///
    /// The collection to touch is re-derived from the role claim of the
    /// caller's (already verified) token; a role tag outside the known set
    /// fails with `UnknownRole`.
    pub async fn change_password(
        &self,
        principal_id: &str,
        role: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let role = Role::from_str(role).map_err(|e| AuthError::UnknownRole(e.0))?;
        // A signed token whose subject is not a UUID cannot match any record.
        let id = Uuid::from_str(principal_id).map_err(|_| AuthError::PrincipalNotFound)?;

        if new_password.is_empty() {
            return Err(DomainError::validation("new password cannot be empty").into());
        }

        match role {
            Role::Admin => {
                let id = AdminId::from_uuid(id);
                let record = self
                    .admins
                    .find_by_id(id)
                    .await?
                    .ok_or(AuthError::PrincipalNotFound)?;
                if !verify_password(&record.password_hash, current_password) {
                    return Err(AuthError::InvalidCurrentPassword);
                }
                let hash = hash_password(new_password)?;
                if !self.admins.set_password_hash(id, hash).await? {
                    return Err(AuthError::PrincipalNotFound);
                }
            }
            Role::Student => {
                let id = StudentId::from_uuid(id);
                let record = self
                    .students
                    .find_by_id(id)
                    .await?
                    .ok_or(AuthError::PrincipalNotFound)?;
                if !verify_password(&record.password_hash, current_password) {
                    return Err(AuthError::InvalidCurrentPassword);
                }
                let hash = hash_password(new_password)?;
                if !self.students.set_password_hash(id, hash).await? {
                    return Err(AuthError::PrincipalNotFound);
                }
            }
            Role::Staff => {
                let id = StaffId::from_uuid(id);
                let record = self
                    .staff
                    .find_by_id(id)
                    .await?
                    .ok_or(AuthError::PrincipalNotFound)?;
                if !verify_password(&record.password_hash, current_password) {
                    return Err(AuthError::InvalidCurrentPassword);
                }
                let hash = hash_password(new_password)?;
                if !self.staff.set_password_hash(id, hash).await? {
                    return Err(AuthError::PrincipalNotFound);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registrar_auth::{GLOBAL_FACULTY, Hs256TokenCodec};
    use registrar_identity::{AdminRecord, StaffRecord, StudentRecord};

    use crate::store::memory::{InMemoryAdminStore, InMemoryStaffStore, InMemoryStudentStore};

    struct Fixture {
        resolver: CredentialResolver,
        admins: Arc<InMemoryAdminStore>,
        students: Arc<InMemoryStudentStore>,
        staff: Arc<InMemoryStaffStore>,
    }

    fn fixture() -> Fixture {
        let admins = Arc::new(InMemoryAdminStore::new());
        let students = Arc::new(InMemoryStudentStore::new());
        let staff = Arc::new(InMemoryStaffStore::new());
        let tokens = Arc::new(Hs256TokenCodec::new(b"test-secret"));

        let resolver = CredentialResolver::new(
            admins.clone(),
            students.clone(),
            staff.clone(),
            tokens,
        );
        Fixture {
            resolver,
            admins,
            students,
            staff,
        }
    }

    fn student(username: &str, reg_number: &str, password: &str) -> StudentRecord {
        StudentRecord {
            id: StudentId::new(),
            name: "Alice Perera".to_string(),
            reg_number: reg_number.to_string(),
            index_number: None,
            academic_year: None,
            enrollment_date: None,
            username: username.to_string(),
            password_hash: hash_password(password).unwrap(),
            faculty: "Applied Science".to_string(),
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

    fn staff_member(username: &str, staff_number: &str, password: &str) -> StaffRecord {
        StaffRecord {
            id: StaffId::new(),
            name: "Dr. Alice Smith".to_string(),
            staff_number: staff_number.to_string(),
            department: "Information and Communication Technology".to_string(),
            faculty: "Applied Science".to_string(),
            email: Some("alice@univ.edu".to_string()),
            username: username.to_string(),
            password_hash: hash_password(password).unwrap(),
            role: None,
        }
    }

    #[tokio::test]
    async fn admin_login_works_with_or_without_faculty_hint() {
        let fx = fixture();
        fx.admins
            .insert(AdminRecord::new("admin", hash_password("admin123").unwrap()))
            .await
            .unwrap();

        for hint in [None, Some("Business Studies")] {
            let outcome = fx
                .resolver
                .login("admin", "admin123", hint, Utc::now())
                .await
                .unwrap();
            assert_eq!(outcome.claims.role, "admin");
            assert_eq!(outcome.claims.faculty, GLOBAL_FACULTY);
        }
    }

    #[tokio::test]
    async fn student_logs_in_by_username_or_reg_number() {
        let fx = fixture();
        fx.students
            .insert(student("alice", "2024/FAS/001", "password123"))
            .await
            .unwrap();

        for login in ["alice", "2024/FAS/001"] {
            let outcome = fx
                .resolver
                .login(login, "password123", Some("Applied Science"), Utc::now())
                .await
                .unwrap();
            assert_eq!(outcome.claims.role, "student");
            assert_eq!(outcome.claims.username, "alice");
            assert_eq!(outcome.claims.faculty, "Applied Science");
        }
    }

    #[tokio::test]
    async fn staff_logs_in_by_staff_number_and_wrong_password_is_rejected() {
        let fx = fixture();
        fx.staff
            .insert(staff_member("Staff/fas/01", "STF001", "uov2026user"))
            .await
            .unwrap();

        let outcome = fx
            .resolver
            .login("STF001", "uov2026user", Some("Applied Science"), Utc::now())
            .await
            .unwrap();
        assert_eq!(outcome.claims.role, "staff");

        let err = fx
            .resolver
            .login("STF001", "wrong", Some("Applied Science"), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn unknown_username_fails_with_principal_not_found() {
        let fx = fixture();
        let err = fx
            .resolver
            .login("nobody", "secret", None, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::PrincipalNotFound));
    }

    #[tokio::test]
    async fn cross_collection_collision_resolved_by_search_order() {
        let fx = fixture();
        fx.admins
            .insert(AdminRecord::new("jordan", hash_password("adminpass").unwrap()))
            .await
            .unwrap();
        fx.students
            .insert(student("jordan", "2024/FAS/009", "studentpass"))
            .await
            .unwrap();

        // No hint: the admin collection is searched first and wins.
        let outcome = fx
            .resolver
            .login("jordan", "adminpass", None, Utc::now())
            .await
            .unwrap();
        assert_eq!(outcome.claims.role, "admin");

        // With a faculty hint the admin collection is skipped entirely.
        let outcome = fx
            .resolver
            .login("jordan", "studentpass", Some("Applied Science"), Utc::now())
            .await
            .unwrap();
        assert_eq!(outcome.claims.role, "student");
    }

    #[tokio::test]
    async fn signup_rejects_duplicate_username() {
        let fx = fixture();
        let signup = NewStudent {
            reg_number: "2024/FAS/001".to_string(),
            name: "Alice Perera".to_string(),
            enrollment_date: None,
            index_number: None,
            academic_year: None,
            faculty: "Applied Science".to_string(),
            username: "alice".to_string(),
            password: "password123".to_string(),
        };

        fx.resolver.signup(signup.clone()).await.unwrap();
        let err = fx.resolver.signup(signup).await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUsername));
    }

    #[tokio::test]
    async fn signup_then_login_round_trips() {
        let fx = fixture();
        let signup = NewStudent {
            reg_number: "2024/FAS/002".to_string(),
            name: "Bob Silva".to_string(),
            enrollment_date: Some("2024-01-15".to_string()),
            index_number: None,
            academic_year: None,
            faculty: "Business Studies".to_string(),
            username: "bob".to_string(),
            password: "hunter2hunter2".to_string(),
        };
        let id = fx.resolver.signup(signup).await.unwrap();

        let outcome = fx
            .resolver
            .login("bob", "hunter2hunter2", Some("Business Studies"), Utc::now())
            .await
            .unwrap();
        assert_eq!(outcome.claims.sub, id.to_string());
    }

    #[tokio::test]
    async fn change_password_verifies_current_and_replaces_hash() {
        let fx = fixture();
        let record = student("alice", "2024/FAS/001", "oldpassword");
        let id = record.id;
        fx.students.insert(record).await.unwrap();

        let err = fx
            .resolver
            .change_password(&id.to_string(), "student", "wrong", "newpassword")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCurrentPassword));

        fx.resolver
            .change_password(&id.to_string(), "student", "oldpassword", "newpassword")
            .await
            .unwrap();

        let outcome = fx
            .resolver
            .login("alice", "newpassword", Some("Applied Science"), Utc::now())
            .await
            .unwrap();
        assert_eq!(outcome.claims.username, "alice");
    }

    #[tokio::test]
    async fn change_password_rejects_unknown_role() {
        let fx = fixture();
        let err = fx
            .resolver
            .change_password(&Uuid::now_v7().to_string(), "superuser", "a", "b")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UnknownRole(role) if role == "superuser"));
    }

    #[tokio::test]
    async fn change_password_for_missing_principal_fails() {
        let fx = fixture();
        let err = fx
            .resolver
            .change_password(&Uuid::now_v7().to_string(), "admin", "a", "b")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::PrincipalNotFound));
    }
}
