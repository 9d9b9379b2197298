//! The enrollment ledger: assignment creation (single and bulk), grade and
//! attendance updates, and reads that resolve foreign keys into summary
//! views.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use registrar_catalog::{CourseOfferingRecord, CourseRecord, Semester};
use registrar_core::{CourseId, CourseOfferingId, DomainError, EnrollmentId, StaffId, StudentId};
use registrar_enrollment::{EnrollmentKey, EnrollmentRecord, EnrollmentStatus, EnrollmentUpdate};
use registrar_identity::{StaffRecord, StudentRecord};

use crate::store::{CatalogStore, EnrollmentFilter, EnrollmentStore, StaffStore, StoreError, StudentStore};

/// Ledger operation error.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("this student-course-staff combination already exists")]
    DuplicateCombination,

    #[error("enrollment record not found")]
    NotFound,

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Student fields exposed on enrollment reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub id: StudentId,
    pub name: String,
    pub username: String,
    pub faculty: String,
    pub department: Option<String>,
}

impl From<StudentRecord> for StudentSummary {
    fn from(record: StudentRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            username: record.username,
            faculty: record.faculty,
            department: record.department,
        }
    }
}

/// Staff fields exposed on enrollment reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffSummary {
    pub id: StaffId,
    pub name: String,
    pub email: Option<String>,
    pub department: String,
}

impl From<StaffRecord> for StaffSummary {
    fn from(record: StaffRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            department: record.department,
        }
    }
}

/// Course-offering fields exposed on enrollment reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferingSummary {
    pub id: CourseOfferingId,
    pub course_name: String,
    pub course_code: String,
    pub semester: Semester,
    pub level: String,
    pub faculty: String,
    pub department: String,
}

impl From<CourseOfferingRecord> for OfferingSummary {
    fn from(record: CourseOfferingRecord) -> Self {
        Self {
            id: record.id,
            course_name: record.course_name,
            course_code: record.course_code,
            semester: record.semester,
            level: record.level,
            faculty: record.faculty,
            department: record.department,
        }
    }
}

/// Course fields exposed on enrollment reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: CourseId,
    pub course_name: String,
    pub course_code: String,
    pub credits: u32,
}

impl From<CourseRecord> for CourseSummary {
    fn from(record: CourseRecord) -> Self {
        Self {
            id: record.id,
            course_name: record.course_name,
            course_code: record.course_code,
            credits: record.credits,
        }
    }
}

/// An enrollment record with its foreign keys resolved into summaries.
///
/// A reference to a since-deleted principal or catalog entry resolves to
/// `None` rather than failing the read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentView {
    #[serde(flatten)]
    pub record: EnrollmentRecord,
    pub offering: Option<OfferingSummary>,
    pub staff: Option<StaffSummary>,
    pub student: Option<StudentSummary>,
    pub course: Option<CourseSummary>,
}

/// Per-student failure collected during a bulk assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAssignFailure {
    pub student_id: StudentId,
    pub error: String,
}

/// Outcome of a bulk assignment: what was created and what failed, so the
/// caller can retry only the failures.
#[derive(Debug, Clone, Default)]
pub struct BulkAssignReport {
    pub created: Vec<EnrollmentRecord>,
    pub errors: Vec<BulkAssignFailure>,
}

/// Application service owning enrollment records.
///
/// Principal and catalog stores are referenced for read-side summaries only;
/// ledger operations never mutate them.
pub struct EnrollmentLedger {
    enrollments: Arc<dyn EnrollmentStore>,
    students: Arc<dyn StudentStore>,
    staff: Arc<dyn StaffStore>,
    catalog: Arc<dyn CatalogStore>,
}

impl EnrollmentLedger {
    pub fn new(
        enrollments: Arc<dyn EnrollmentStore>,
        students: Arc<dyn StudentStore>,
        staff: Arc<dyn StaffStore>,
        catalog: Arc<dyn CatalogStore>,
    ) -> Self {
        Self {
            enrollments,
            students,
            staff,
            catalog,
        }
    }

    /// Create a single enrollment record.
    ///
    /// The pre-check is a fast path; the store's uniqueness rejection is the
    /// authoritative duplicate signal under concurrent identical requests.
    pub async fn create(
        &self,
        key: EnrollmentKey,
        attendance: Option<f64>,
        now: DateTime<Utc>,
    ) -> Result<EnrollmentRecord, LedgerError> {
        if let Some(attendance) = attendance {
            if !(0.0..=100.0).contains(&attendance) {
                return Err(DomainError::validation("attendance must be between 0 and 100").into());
            }
        }

        if self.enrollments.find_by_key(&key).await?.is_some() {
            return Err(LedgerError::DuplicateCombination);
        }

        let record = EnrollmentRecord::new(key, attendance, now);
        match self.enrollments.insert(record.clone()).await {
            Ok(()) => Ok(record),
            Err(StoreError::Duplicate(_)) => {
                tracing::warn!(
                    student_id = %key.student_id,
                    "duplicate enrollment lost the race to a concurrent insert"
                );
                Err(LedgerError::DuplicateCombination)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Assign many students to one (offering, staff, course) in one call.
    ///
    /// Each student is processed independently: a duplicate combination or
    /// storage failure for one student is collected into the report and does
    /// not abort or roll back the others.
    pub async fn bulk_assign(
        &self,
        offering_id: CourseOfferingId,
        staff_id: StaffId,
        course_id: CourseId,
        student_ids: &[StudentId],
        now: DateTime<Utc>,
    ) -> Result<BulkAssignReport, LedgerError> {
        if student_ids.is_empty() {
            return Err(DomainError::validation("studentIds must not be empty").into());
        }

        let mut report = BulkAssignReport::default();
        for &student_id in student_ids {
            let key = EnrollmentKey {
                offering_id,
                staff_id,
                student_id,
                course_id,
            };
            match self.create(key, None, now).await {
                Ok(record) => report.created.push(record),
                Err(e) => report.errors.push(BulkAssignFailure {
                    student_id,
                    error: e.to_string(),
                }),
            }
        }
        Ok(report)
    }

    /// Apply a validated partial update to a record's academic fields.
    pub async fn update(
        &self,
        id: EnrollmentId,
        update: EnrollmentUpdate,
        now: DateTime<Utc>,
    ) -> Result<EnrollmentRecord, LedgerError> {
        update.validate()?;

        let mut record = self
            .enrollments
            .find_by_id(id)
            .await?
            .ok_or(LedgerError::NotFound)?;
        update.apply(&mut record, now);

        if !self.enrollments.update(&record).await? {
            return Err(LedgerError::NotFound);
        }
        Ok(record)
    }

    /// Delete a record by id. The referenced principals and catalog entries
    /// are untouched.
    pub async fn delete(&self, id: EnrollmentId) -> Result<(), LedgerError> {
        if !self.enrollments.delete(id).await? {
            return Err(LedgerError::NotFound);
        }
        Ok(())
    }

    /// Fetch one record by id, with summaries resolved.
    pub async fn get(&self, id: EnrollmentId) -> Result<EnrollmentView, LedgerError> {
        let record = self
            .enrollments
            .find_by_id(id)
            .await?
            .ok_or(LedgerError::NotFound)?;
        self.resolve_view(record).await
    }

    /// List records matching the filter, most recent enrollment date first.
    pub async fn list(&self, filter: &EnrollmentFilter) -> Result<Vec<EnrollmentView>, LedgerError> {
        let records = self.enrollments.list(filter).await?;
        let mut views = Vec::with_capacity(records.len());
        for record in records {
            views.push(self.resolve_view(record).await?);
        }
        Ok(views)
    }

    /// All active assignments for one student.
    pub async fn active_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<EnrollmentView>, LedgerError> {
        self.list(&EnrollmentFilter {
            student_id: Some(student_id),
            status: Some(EnrollmentStatus::Active),
            ..Default::default()
        })
        .await
    }

    /// All active assignments for one staff member.
    pub async fn active_for_staff(
        &self,
        staff_id: StaffId,
    ) -> Result<Vec<EnrollmentView>, LedgerError> {
        self.list(&EnrollmentFilter {
            staff_id: Some(staff_id),
            status: Some(EnrollmentStatus::Active),
            ..Default::default()
        })
        .await
    }

    async fn resolve_view(&self, record: EnrollmentRecord) -> Result<EnrollmentView, LedgerError> {
        let offering = self.catalog.find_offering(record.offering_id).await?;
        let staff = self.staff.find_by_id(record.staff_id).await?;
        let student = self.students.find_by_id(record.student_id).await?;
        let course = self.catalog.find_course(record.course_id).await?;

        Ok(EnrollmentView {
            record,
            offering: offering.map(Into::into),
            staff: staff.map(Into::into),
            student: student.map(Into::into),
            course: course.map(Into::into),
        })
    }
}
