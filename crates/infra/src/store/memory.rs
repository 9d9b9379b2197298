//! In-memory stores for tests/dev. Not optimized for performance.
//!
//! Uniqueness checks happen under the map's write lock, so the guarantees
//! match the Postgres implementations: a concurrent identical insert loses
//! with `Duplicate` instead of slipping through.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use registrar_catalog::{CourseOfferingRecord, CourseRecord};
use registrar_core::{AdminId, CourseId, CourseOfferingId, EnrollmentId, StaffId, StudentId};
use registrar_enrollment::{EnrollmentKey, EnrollmentRecord};
use registrar_identity::{AdminRecord, StaffRecord, StudentRecord};

use super::{
    AdminStore, CatalogStore, EnrollmentFilter, EnrollmentStore, StaffStore, StoreError,
    StudentStore,
};

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

/// In-memory administrator collection.
#[derive(Debug, Default)]
pub struct InMemoryAdminStore {
    records: RwLock<HashMap<AdminId, AdminRecord>>,
}

impl InMemoryAdminStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdminStore for InMemoryAdminStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminRecord>, StoreError> {
        let map = self.records.read().map_err(|_| poisoned())?;
        Ok(map.values().find(|r| r.username == username).cloned())
    }

    async fn find_by_id(&self, id: AdminId) -> Result<Option<AdminRecord>, StoreError> {
        let map = self.records.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn insert(&self, record: AdminRecord) -> Result<(), StoreError> {
        let mut map = self.records.write().map_err(|_| poisoned())?;
        if map.values().any(|r| r.username == record.username) {
            return Err(StoreError::Duplicate(format!(
                "admin username '{}'",
                record.username
            )));
        }
        map.insert(record.id, record);
        Ok(())
    }

    async fn set_password_hash(&self, id: AdminId, hash: String) -> Result<bool, StoreError> {
        let mut map = self.records.write().map_err(|_| poisoned())?;
        match map.get_mut(&id) {
            Some(record) => {
                record.password_hash = hash;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// In-memory student collection.
#[derive(Debug, Default)]
pub struct InMemoryStudentStore {
    records: RwLock<HashMap<StudentId, StudentRecord>>,
}

impl InMemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StudentStore for InMemoryStudentStore {
    async fn find_by_login(&self, login: &str) -> Result<Option<StudentRecord>, StoreError> {
        let map = self.records.read().map_err(|_| poisoned())?;
        Ok(map
            .values()
            .find(|r| r.username == login || r.reg_number == login)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<StudentRecord>, StoreError> {
        let map = self.records.read().map_err(|_| poisoned())?;
        Ok(map.values().find(|r| r.username == username).cloned())
    }

    async fn find_by_id(&self, id: StudentId) -> Result<Option<StudentRecord>, StoreError> {
        let map = self.records.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn insert(&self, record: StudentRecord) -> Result<(), StoreError> {
        let mut map = self.records.write().map_err(|_| poisoned())?;
        if map.values().any(|r| r.username == record.username) {
            return Err(StoreError::Duplicate(format!(
                "student username '{}'",
                record.username
            )));
        }
        map.insert(record.id, record);
        Ok(())
    }

    async fn set_password_hash(&self, id: StudentId, hash: String) -> Result<bool, StoreError> {
        let mut map = self.records.write().map_err(|_| poisoned())?;
        match map.get_mut(&id) {
            Some(record) => {
                record.password_hash = hash;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// In-memory staff collection.
#[derive(Debug, Default)]
pub struct InMemoryStaffStore {
    records: RwLock<HashMap<StaffId, StaffRecord>>,
}

impl InMemoryStaffStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StaffStore for InMemoryStaffStore {
    async fn find_by_login(&self, login: &str) -> Result<Option<StaffRecord>, StoreError> {
        let map = self.records.read().map_err(|_| poisoned())?;
        Ok(map
            .values()
            .find(|r| r.username == login || r.staff_number == login)
            .cloned())
    }

    async fn find_by_id(&self, id: StaffId) -> Result<Option<StaffRecord>, StoreError> {
        let map = self.records.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn insert(&self, record: StaffRecord) -> Result<(), StoreError> {
        let mut map = self.records.write().map_err(|_| poisoned())?;
        if map.values().any(|r| r.username == record.username) {
            return Err(StoreError::Duplicate(format!(
                "staff username '{}'",
                record.username
            )));
        }
        map.insert(record.id, record);
        Ok(())
    }

    async fn set_password_hash(&self, id: StaffId, hash: String) -> Result<bool, StoreError> {
        let mut map = self.records.write().map_err(|_| poisoned())?;
        match map.get_mut(&id) {
            Some(record) => {
                record.password_hash = hash;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// In-memory enrollment ledger store.
#[derive(Debug, Default)]
pub struct InMemoryEnrollmentStore {
    records: RwLock<HashMap<EnrollmentId, EnrollmentRecord>>,
}

impl InMemoryEnrollmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_filter(record: &EnrollmentRecord, filter: &EnrollmentFilter) -> bool {
    if let Some(student_id) = filter.student_id {
        if record.student_id != student_id {
            return false;
        }
    }
    if let Some(staff_id) = filter.staff_id {
        if record.staff_id != staff_id {
            return false;
        }
    }
    if let Some(offering_id) = filter.offering_id {
        if record.offering_id != offering_id {
            return false;
        }
    }
    if let Some(status) = filter.status {
        if record.status != status {
            return false;
        }
    }
    true
}

#[async_trait]
impl EnrollmentStore for InMemoryEnrollmentStore {
    async fn insert(&self, record: EnrollmentRecord) -> Result<(), StoreError> {
        // Check-and-insert under one write lock: the 4-tuple invariant is
        // hard here, not best-effort.
        let mut map = self.records.write().map_err(|_| poisoned())?;
        let key = record.key();
        if map.values().any(|r| r.key() == key) {
            return Err(StoreError::Duplicate(
                "enrollment (offering, staff, student, course)".to_string(),
            ));
        }
        map.insert(record.id, record);
        Ok(())
    }

    async fn find_by_id(&self, id: EnrollmentId) -> Result<Option<EnrollmentRecord>, StoreError> {
        let map = self.records.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn find_by_key(
        &self,
        key: &EnrollmentKey,
    ) -> Result<Option<EnrollmentRecord>, StoreError> {
        let map = self.records.read().map_err(|_| poisoned())?;
        Ok(map.values().find(|r| r.key() == *key).cloned())
    }

    async fn update(&self, record: &EnrollmentRecord) -> Result<bool, StoreError> {
        let mut map = self.records.write().map_err(|_| poisoned())?;
        match map.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: EnrollmentId) -> Result<bool, StoreError> {
        let mut map = self.records.write().map_err(|_| poisoned())?;
        Ok(map.remove(&id).is_some())
    }

    async fn list(&self, filter: &EnrollmentFilter) -> Result<Vec<EnrollmentRecord>, StoreError> {
        let map = self.records.read().map_err(|_| poisoned())?;
        let mut records: Vec<EnrollmentRecord> = map
            .values()
            .filter(|r| matches_filter(r, filter))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.enrollment_date.cmp(&a.enrollment_date));
        Ok(records)
    }
}

/// In-memory catalog reference data.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    offerings: RwLock<HashMap<CourseOfferingId, CourseOfferingRecord>>,
    courses: RwLock<HashMap<CourseId, CourseRecord>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn find_offering(
        &self,
        id: CourseOfferingId,
    ) -> Result<Option<CourseOfferingRecord>, StoreError> {
        let map = self.offerings.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn find_course(&self, id: CourseId) -> Result<Option<CourseRecord>, StoreError> {
        let map = self.courses.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn insert_offering(&self, record: CourseOfferingRecord) -> Result<(), StoreError> {
        let mut map = self.offerings.write().map_err(|_| poisoned())?;
        map.insert(record.id, record);
        Ok(())
    }

    async fn insert_course(&self, record: CourseRecord) -> Result<(), StoreError> {
        let mut map = self.courses.write().map_err(|_| poisoned())?;
        map.insert(record.id, record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use registrar_enrollment::EnrollmentStatus;

    fn key() -> EnrollmentKey {
        EnrollmentKey {
            offering_id: CourseOfferingId::new(),
            staff_id: StaffId::new(),
            student_id: StudentId::new(),
            course_id: CourseId::new(),
        }
    }

    #[tokio::test]
    async fn enrollment_insert_rejects_duplicate_key() {
        let store = InMemoryEnrollmentStore::new();
        let k = key();
        let now = Utc::now();

        store.insert(EnrollmentRecord::new(k, None, now)).await.unwrap();
        let err = store
            .insert(EnrollmentRecord::new(k, None, now))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn list_sorts_most_recent_first() {
        let store = InMemoryEnrollmentStore::new();
        let now = Utc::now();

        let older = EnrollmentRecord::new(key(), None, now - Duration::days(2));
        let newer = EnrollmentRecord::new(key(), None, now);
        let older_id = older.id;
        let newer_id = newer.id;

        store.insert(older).await.unwrap();
        store.insert(newer).await.unwrap();

        let listed = store.list(&EnrollmentFilter::default()).await.unwrap();
        assert_eq!(listed[0].id, newer_id);
        assert_eq!(listed[1].id, older_id);
    }

    #[tokio::test]
    async fn list_filters_combine() {
        let store = InMemoryEnrollmentStore::new();
        let now = Utc::now();
        let k = key();

        let mut completed = EnrollmentRecord::new(k, None, now);
        completed.status = EnrollmentStatus::Completed;
        let completed_id = completed.id;
        store.insert(completed).await.unwrap();
        store
            .insert(EnrollmentRecord::new(key(), None, now))
            .await
            .unwrap();

        let filter = EnrollmentFilter {
            student_id: Some(k.student_id),
            status: Some(EnrollmentStatus::Completed),
            ..Default::default()
        };
        let listed = store.list(&filter).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, completed_id);
    }

    #[tokio::test]
    async fn student_login_aliases() {
        let store = InMemoryStudentStore::new();
        let record = StudentRecord {
            id: StudentId::new(),
            name: "Alice Perera".to_string(),
            reg_number: "2024/FAS/001".to_string(),
            index_number: None,
            academic_year: None,
            enrollment_date: None,
            username: "alice".to_string(),
            password_hash: "phc".to_string(),
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
        };
        store.insert(record).await.unwrap();

        assert!(store.find_by_login("alice").await.unwrap().is_some());
        assert!(store.find_by_login("2024/FAS/001").await.unwrap().is_some());
        // The signup collision check matches the username only.
        assert!(store.find_by_username("2024/FAS/001").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_rejected_per_collection() {
        let store = InMemoryAdminStore::new();
        store.insert(AdminRecord::new("admin", "phc")).await.unwrap();
        let err = store.insert(AdminRecord::new("admin", "phc2")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }
}
