//! Postgres-backed stores (sqlx).
//!
//! Expected schema (owned by the deployment, mirroring the record types):
//!
//! ```sql
//! CREATE TABLE admins (
//!     id            UUID PRIMARY KEY,
//!     username      TEXT NOT NULL UNIQUE,
//!     password_hash TEXT NOT NULL,
//!     role          TEXT,
//!     faculty       TEXT
//! );
//!
//! CREATE TABLE students (
//!     id              UUID PRIMARY KEY,
//!     name            TEXT NOT NULL,
//!     reg_number      TEXT NOT NULL,
//!     index_number    TEXT,
//!     academic_year   TEXT,
//!     enrollment_date TEXT,
//!     username        TEXT NOT NULL UNIQUE,
//!     password_hash   TEXT NOT NULL,
//!     faculty         TEXT NOT NULL,
//!     department      TEXT,
//!     email           TEXT,
//!     role            TEXT,
//!     nic             TEXT,
//!     mobile          TEXT,
//!     address         TEXT,
//!     gender          TEXT,
//!     birthdate       TEXT,
//!     level           TEXT
//! );
//!
//! CREATE TABLE staff (
//!     id            UUID PRIMARY KEY,
//!     name          TEXT NOT NULL,
//!     staff_number  TEXT NOT NULL,
//!     department    TEXT NOT NULL,
//!     faculty       TEXT NOT NULL,
//!     email         TEXT,
//!     username      TEXT NOT NULL UNIQUE,
//!     password_hash TEXT NOT NULL,
//!     role          TEXT
//! );
//!
//! CREATE TABLE enrollments (
//!     id              UUID PRIMARY KEY,
//!     offering_id     UUID NOT NULL,
//!     staff_id        UUID NOT NULL,
//!     student_id      UUID NOT NULL,
//!     course_id       UUID NOT NULL,
//!     enrollment_date TIMESTAMPTZ NOT NULL,
//!     status          TEXT NOT NULL,
//!     marks           DOUBLE PRECISION,
//!     grade           TEXT,
//!     gpa             DOUBLE PRECISION,
//!     attendance      DOUBLE PRECISION NOT NULL,
//!     created_at      TIMESTAMPTZ NOT NULL,
//!     updated_at      TIMESTAMPTZ NOT NULL
//! );
//! -- The 4-tuple invariant lives in storage, not application code.
//! CREATE UNIQUE INDEX enrollments_assignment_key
//!     ON enrollments (offering_id, staff_id, student_id, course_id);
//! CREATE INDEX enrollments_student ON enrollments (student_id);
//! CREATE INDEX enrollments_staff ON enrollments (staff_id);
//!
//! CREATE TABLE course_offerings (
//!     id          UUID PRIMARY KEY,
//!     course_name TEXT NOT NULL,
//!     course_code TEXT NOT NULL,
//!     semester    TEXT NOT NULL,
//!     level       TEXT NOT NULL,
//!     faculty     TEXT NOT NULL,
//!     department  TEXT NOT NULL
//! );
//!
//! CREATE TABLE courses (
//!     id          UUID PRIMARY KEY,
//!     course_name TEXT NOT NULL,
//!     course_code TEXT NOT NULL,
//!     credits     INTEGER NOT NULL
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use registrar_auth::Role;
use registrar_catalog::{CourseOfferingRecord, CourseRecord, Semester};
use registrar_core::{AdminId, CourseId, CourseOfferingId, EnrollmentId, StaffId, StudentId};
use registrar_enrollment::{
    EnrollmentKey, EnrollmentRecord, EnrollmentStatus, LetterGrade,
};
use registrar_identity::{AdminRecord, StaffRecord, StudentRecord};

use super::{
    AdminStore, CatalogStore, EnrollmentFilter, EnrollmentStore, StaffStore, StoreError,
    StudentStore,
};

fn corrupt(what: &str, detail: impl core::fmt::Display) -> StoreError {
    StoreError::Backend(format!("corrupt row ({what}): {detail}"))
}

fn role_from_row(row: &PgRow) -> Result<Option<Role>, StoreError> {
    let role: Option<String> = row.try_get("role")?;
    role.map(|s| s.parse::<Role>())
        .transpose()
        .map_err(|e| corrupt("role", e))
}

fn admin_from_row(row: &PgRow) -> Result<AdminRecord, StoreError> {
    Ok(AdminRecord {
        id: AdminId::from_uuid(row.try_get::<Uuid, _>("id")?),
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        role: role_from_row(row)?,
        faculty: row.try_get("faculty")?,
    })
}

fn student_from_row(row: &PgRow) -> Result<StudentRecord, StoreError> {
    Ok(StudentRecord {
        id: StudentId::from_uuid(row.try_get::<Uuid, _>("id")?),
        name: row.try_get("name")?,
        reg_number: row.try_get("reg_number")?,
        index_number: row.try_get("index_number")?,
        academic_year: row.try_get("academic_year")?,
        enrollment_date: row.try_get("enrollment_date")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        faculty: row.try_get("faculty")?,
        department: row.try_get("department")?,
        email: row.try_get("email")?,
        role: role_from_row(row)?,
        nic: row.try_get("nic")?,
        mobile: row.try_get("mobile")?,
        address: row.try_get("address")?,
        gender: row.try_get("gender")?,
        birthdate: row.try_get("birthdate")?,
        level: row.try_get("level")?,
    })
}

fn staff_from_row(row: &PgRow) -> Result<StaffRecord, StoreError> {
    Ok(StaffRecord {
        id: StaffId::from_uuid(row.try_get::<Uuid, _>("id")?),
        name: row.try_get("name")?,
        staff_number: row.try_get("staff_number")?,
        department: row.try_get("department")?,
        faculty: row.try_get("faculty")?,
        email: row.try_get("email")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        role: role_from_row(row)?,
    })
}

fn enrollment_from_row(row: &PgRow) -> Result<EnrollmentRecord, StoreError> {
    let status: String = row.try_get("status")?;
    let grade: Option<String> = row.try_get("grade")?;
    Ok(EnrollmentRecord {
        id: EnrollmentId::from_uuid(row.try_get::<Uuid, _>("id")?),
        offering_id: CourseOfferingId::from_uuid(row.try_get::<Uuid, _>("offering_id")?),
        staff_id: StaffId::from_uuid(row.try_get::<Uuid, _>("staff_id")?),
        student_id: StudentId::from_uuid(row.try_get::<Uuid, _>("student_id")?),
        course_id: CourseId::from_uuid(row.try_get::<Uuid, _>("course_id")?),
        enrollment_date: row.try_get::<DateTime<Utc>, _>("enrollment_date")?,
        status: status.parse::<EnrollmentStatus>().map_err(|e| corrupt("status", e))?,
        marks: row.try_get("marks")?,
        grade: grade
            .map(|s| s.parse::<LetterGrade>())
            .transpose()
            .map_err(|e| corrupt("grade", e))?,
        gpa: row.try_get("gpa")?,
        attendance: row.try_get("attendance")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn offering_from_row(row: &PgRow) -> Result<CourseOfferingRecord, StoreError> {
    let semester: String = row.try_get("semester")?;
    let semester = match semester.as_str() {
        "First" => Semester::First,
        "Second" => Semester::Second,
        "Third" => Semester::Third,
        other => return Err(corrupt("semester", other)),
    };
    Ok(CourseOfferingRecord {
        id: CourseOfferingId::from_uuid(row.try_get::<Uuid, _>("id")?),
        course_name: row.try_get("course_name")?,
        course_code: row.try_get("course_code")?,
        semester,
        level: row.try_get("level")?,
        faculty: row.try_get("faculty")?,
        department: row.try_get("department")?,
    })
}

fn course_from_row(row: &PgRow) -> Result<CourseRecord, StoreError> {
    let credits: i32 = row.try_get("credits")?;
    Ok(CourseRecord {
        id: CourseId::from_uuid(row.try_get::<Uuid, _>("id")?),
        course_name: row.try_get("course_name")?,
        course_code: row.try_get("course_code")?,
        credits: credits as u32,
    })
}

fn semester_str(semester: Semester) -> &'static str {
    match semester {
        Semester::First => "First",
        Semester::Second => "Second",
        Semester::Third => "Third",
    }
}

/// Postgres-backed administrator collection.
pub struct PgAdminStore {
    pool: PgPool,
}

impl PgAdminStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminStore for PgAdminStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, role, faculty FROM admins WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(admin_from_row).transpose()
    }

    async fn find_by_id(&self, id: AdminId) -> Result<Option<AdminRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, role, faculty FROM admins WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(admin_from_row).transpose()
    }

    async fn insert(&self, record: AdminRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO admins (id, username, password_hash, role, faculty)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(record.id.as_uuid())
        .bind(&record.username)
        .bind(&record.password_hash)
        .bind(record.role.map(|r| r.as_str()))
        .bind(&record.faculty)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_password_hash(&self, id: AdminId, hash: String) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE admins SET password_hash = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(&hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

const STUDENT_COLUMNS: &str = "id, name, reg_number, index_number, academic_year, \
     enrollment_date, username, password_hash, faculty, department, email, role, \
     nic, mobile, address, gender, birthdate, level";

/// Postgres-backed student collection.
pub struct PgStudentStore {
    pool: PgPool,
}

impl PgStudentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentStore for PgStudentStore {
    async fn find_by_login(&self, login: &str) -> Result<Option<StudentRecord>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE username = $1 OR reg_number = $1"
        ))
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(student_from_row).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<StudentRecord>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(student_from_row).transpose()
    }

    async fn find_by_id(&self, id: StudentId) -> Result<Option<StudentRecord>, StoreError> {
        let row = sqlx::query(&format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(student_from_row).transpose()
    }

    async fn insert(&self, record: StudentRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO students (id, name, reg_number, index_number, academic_year, \
             enrollment_date, username, password_hash, faculty, department, email, role, \
             nic, mobile, address, gender, birthdate, level)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
        )
        .bind(record.id.as_uuid())
        .bind(&record.name)
        .bind(&record.reg_number)
        .bind(&record.index_number)
        .bind(&record.academic_year)
        .bind(&record.enrollment_date)
        .bind(&record.username)
        .bind(&record.password_hash)
        .bind(&record.faculty)
        .bind(&record.department)
        .bind(&record.email)
        .bind(record.role.map(|r| r.as_str()))
        .bind(&record.nic)
        .bind(&record.mobile)
        .bind(&record.address)
        .bind(&record.gender)
        .bind(&record.birthdate)
        .bind(&record.level)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_password_hash(&self, id: StudentId, hash: String) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE students SET password_hash = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(&hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

const STAFF_COLUMNS: &str =
    "id, name, staff_number, department, faculty, email, username, password_hash, role";

/// Postgres-backed staff collection.
pub struct PgStaffStore {
    pool: PgPool,
}

impl PgStaffStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StaffStore for PgStaffStore {
    async fn find_by_login(&self, login: &str) -> Result<Option<StaffRecord>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {STAFF_COLUMNS} FROM staff WHERE username = $1 OR staff_number = $1"
        ))
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(staff_from_row).transpose()
    }

    async fn find_by_id(&self, id: StaffId) -> Result<Option<StaffRecord>, StoreError> {
        let row = sqlx::query(&format!("SELECT {STAFF_COLUMNS} FROM staff WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(staff_from_row).transpose()
    }

    async fn insert(&self, record: StaffRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO staff (id, name, staff_number, department, faculty, email, \
             username, password_hash, role)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(record.id.as_uuid())
        .bind(&record.name)
        .bind(&record.staff_number)
        .bind(&record.department)
        .bind(&record.faculty)
        .bind(&record.email)
        .bind(&record.username)
        .bind(&record.password_hash)
        .bind(record.role.map(|r| r.as_str()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_password_hash(&self, id: StaffId, hash: String) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE staff SET password_hash = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(&hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

const ENROLLMENT_COLUMNS: &str = "id, offering_id, staff_id, student_id, course_id, \
     enrollment_date, status, marks, grade, gpa, attendance, created_at, updated_at";

/// Postgres-backed enrollment store.
///
/// The `enrollments_assignment_key` unique index makes the 4-tuple invariant
/// hold under concurrent writers; unique violations surface as
/// [`StoreError::Duplicate`].
pub struct PgEnrollmentStore {
    pool: PgPool,
}

impl PgEnrollmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EnrollmentStore for PgEnrollmentStore {
    async fn insert(&self, record: EnrollmentRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO enrollments (id, offering_id, staff_id, student_id, course_id, \
             enrollment_date, status, marks, grade, gpa, attendance, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(record.id.as_uuid())
        .bind(record.offering_id.as_uuid())
        .bind(record.staff_id.as_uuid())
        .bind(record.student_id.as_uuid())
        .bind(record.course_id.as_uuid())
        .bind(record.enrollment_date)
        .bind(record.status.as_str())
        .bind(record.marks)
        .bind(record.grade.map(|g| g.as_str()))
        .bind(record.gpa)
        .bind(record.attendance)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: EnrollmentId) -> Result<Option<EnrollmentRecord>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(enrollment_from_row).transpose()
    }

    async fn find_by_key(
        &self,
        key: &EnrollmentKey,
    ) -> Result<Option<EnrollmentRecord>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments
             WHERE offering_id = $1 AND staff_id = $2 AND student_id = $3 AND course_id = $4"
        ))
        .bind(key.offering_id.as_uuid())
        .bind(key.staff_id.as_uuid())
        .bind(key.student_id.as_uuid())
        .bind(key.course_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(enrollment_from_row).transpose()
    }

    async fn update(&self, record: &EnrollmentRecord) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE enrollments
             SET status = $2, marks = $3, grade = $4, gpa = $5, attendance = $6, updated_at = $7
             WHERE id = $1",
        )
        .bind(record.id.as_uuid())
        .bind(record.status.as_str())
        .bind(record.marks)
        .bind(record.grade.map(|g| g.as_str()))
        .bind(record.gpa)
        .bind(record.attendance)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: EnrollmentId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM enrollments WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, filter: &EnrollmentFilter) -> Result<Vec<EnrollmentRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments
             WHERE ($1::uuid IS NULL OR student_id = $1)
               AND ($2::uuid IS NULL OR staff_id = $2)
               AND ($3::uuid IS NULL OR offering_id = $3)
               AND ($4::text IS NULL OR status = $4)
             ORDER BY enrollment_date DESC"
        ))
        .bind(filter.student_id.map(|id| *id.as_uuid()))
        .bind(filter.staff_id.map(|id| *id.as_uuid()))
        .bind(filter.offering_id.map(|id| *id.as_uuid()))
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(enrollment_from_row).collect()
    }
}

/// Postgres-backed catalog reference data.
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn find_offering(
        &self,
        id: CourseOfferingId,
    ) -> Result<Option<CourseOfferingRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT id, course_name, course_code, semester, level, faculty, department
             FROM course_offerings WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(offering_from_row).transpose()
    }

    async fn find_course(&self, id: CourseId) -> Result<Option<CourseRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT id, course_name, course_code, credits FROM courses WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(course_from_row).transpose()
    }

    async fn insert_offering(&self, record: CourseOfferingRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO course_offerings (id, course_name, course_code, semester, level, \
             faculty, department)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(record.id.as_uuid())
        .bind(&record.course_name)
        .bind(&record.course_code)
        .bind(semester_str(record.semester))
        .bind(&record.level)
        .bind(&record.faculty)
        .bind(&record.department)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_course(&self, record: CourseRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO courses (id, course_name, course_code, credits)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(record.id.as_uuid())
        .bind(&record.course_name)
        .bind(&record.course_code)
        .bind(record.credits as i32)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
