//! Storage abstractions for the principal collections, the catalog, and the
//! enrollment ledger.
//!
//! Every trait method is a suspension point; implementations must not hold
//! cross-request locks across awaits. Uniqueness rules (username within a
//! collection, the enrollment 4-tuple) are enforced *here*, not in the
//! services; a store's `Duplicate` rejection is the authoritative signal.

use async_trait::async_trait;
use thiserror::Error;

use registrar_catalog::{CourseOfferingRecord, CourseRecord};
use registrar_core::{AdminId, CourseId, CourseOfferingId, EnrollmentId, StaffId, StudentId};
use registrar_enrollment::{EnrollmentKey, EnrollmentRecord, EnrollmentStatus};
use registrar_identity::{AdminRecord, StaffRecord, StudentRecord};

pub mod memory;
pub mod postgres;

/// Storage-layer error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("duplicate key: {0}")]
    Duplicate(String),

    /// The storage backend failed; fatal to the request, not the process.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(value: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &value {
            if db.is_unique_violation() {
                return StoreError::Duplicate(db.message().to_string());
            }
        }
        StoreError::Backend(value.to_string())
    }
}

/// The administrator collection.
#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminRecord>, StoreError>;
    async fn find_by_id(&self, id: AdminId) -> Result<Option<AdminRecord>, StoreError>;
    /// Insert a new record; `Duplicate` when the username is taken.
    async fn insert(&self, record: AdminRecord) -> Result<(), StoreError>;
    /// Replace the stored password hash. Returns `false` when the record is
    /// absent.
    async fn set_password_hash(&self, id: AdminId, hash: String) -> Result<bool, StoreError>;
}

/// The student collection.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Look up by login alias: username OR registration number.
    async fn find_by_login(&self, login: &str) -> Result<Option<StudentRecord>, StoreError>;
    /// Look up by username only (the signup collision check).
    async fn find_by_username(&self, username: &str) -> Result<Option<StudentRecord>, StoreError>;
    async fn find_by_id(&self, id: StudentId) -> Result<Option<StudentRecord>, StoreError>;
    async fn insert(&self, record: StudentRecord) -> Result<(), StoreError>;
    async fn set_password_hash(&self, id: StudentId, hash: String) -> Result<bool, StoreError>;
}

/// The staff collection.
#[async_trait]
pub trait StaffStore: Send + Sync {
    /// Look up by login alias: username OR staff number.
    async fn find_by_login(&self, login: &str) -> Result<Option<StaffRecord>, StoreError>;
    async fn find_by_id(&self, id: StaffId) -> Result<Option<StaffRecord>, StoreError>;
    async fn insert(&self, record: StaffRecord) -> Result<(), StoreError>;
    async fn set_password_hash(&self, id: StaffId, hash: String) -> Result<bool, StoreError>;
}

/// Filters for enrollment list reads. All fields combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentFilter {
    pub student_id: Option<StudentId>,
    pub staff_id: Option<StaffId>,
    pub offering_id: Option<CourseOfferingId>,
    pub status: Option<EnrollmentStatus>,
}

/// The enrollment ledger's record store.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    /// Insert a new record; `Duplicate` when another record already holds
    /// the same (offering, staff, student, course) key.
    async fn insert(&self, record: EnrollmentRecord) -> Result<(), StoreError>;
    async fn find_by_id(&self, id: EnrollmentId) -> Result<Option<EnrollmentRecord>, StoreError>;
    async fn find_by_key(&self, key: &EnrollmentKey) -> Result<Option<EnrollmentRecord>, StoreError>;
    /// Replace a record by id. Returns `false` when the record is absent.
    async fn update(&self, record: &EnrollmentRecord) -> Result<bool, StoreError>;
    /// Delete by id. Returns `false` when the record is absent.
    async fn delete(&self, id: EnrollmentId) -> Result<bool, StoreError>;
    /// List matching records, most recent enrollment date first.
    async fn list(&self, filter: &EnrollmentFilter) -> Result<Vec<EnrollmentRecord>, StoreError>;
}

/// Read-only view of the externally managed course catalog.
///
/// Inserts exist for loading reference data (dev/tests); there is no
/// catalog management here.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_offering(
        &self,
        id: CourseOfferingId,
    ) -> Result<Option<CourseOfferingRecord>, StoreError>;
    async fn find_course(&self, id: CourseId) -> Result<Option<CourseRecord>, StoreError>;
    async fn insert_offering(&self, record: CourseOfferingRecord) -> Result<(), StoreError>;
    async fn insert_course(&self, record: CourseRecord) -> Result<(), StoreError>;
}
