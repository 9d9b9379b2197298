use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use registrar_core::{CourseId, CourseOfferingId, DomainError, EnrollmentId, StaffId, StudentId};

/// Lifecycle state of an enrollment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EnrollmentStatus {
    #[default]
    Active,
    Completed,
    Dropped,
    Pending,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Active => "Active",
            EnrollmentStatus::Completed => "Completed",
            EnrollmentStatus::Dropped => "Dropped",
            EnrollmentStatus::Pending => "Pending",
        }
    }
}

impl core::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnrollmentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(EnrollmentStatus::Active),
            "Completed" => Ok(EnrollmentStatus::Completed),
            "Dropped" => Ok(EnrollmentStatus::Dropped),
            "Pending" => Ok(EnrollmentStatus::Pending),
            other => Err(DomainError::validation(format!("unknown status: {other}"))),
        }
    }
}

/// Letter grade awarded for a completed course.
///
/// The set is fixed; marks/GPA consistency with the letter is the caller's
/// responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    C,
    #[serde(rename = "C-")]
    CMinus,
    D,
    F,
    P,
}

impl LetterGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            LetterGrade::A => "A",
            LetterGrade::AMinus => "A-",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::BMinus => "B-",
            LetterGrade::CPlus => "C+",
            LetterGrade::C => "C",
            LetterGrade::CMinus => "C-",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
            LetterGrade::P => "P",
        }
    }
}

impl core::fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LetterGrade {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(LetterGrade::A),
            "A-" => Ok(LetterGrade::AMinus),
            "B+" => Ok(LetterGrade::BPlus),
            "B" => Ok(LetterGrade::B),
            "B-" => Ok(LetterGrade::BMinus),
            "C+" => Ok(LetterGrade::CPlus),
            "C" => Ok(LetterGrade::C),
            "C-" => Ok(LetterGrade::CMinus),
            "D" => Ok(LetterGrade::D),
            "F" => Ok(LetterGrade::F),
            "P" => Ok(LetterGrade::P),
            other => Err(DomainError::validation(format!("unknown grade: {other}"))),
        }
    }
}

/// The 4-part composite identity of an enrollment record.
///
/// No two records may share all four keys; storage enforces this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnrollmentKey {
    pub offering_id: CourseOfferingId,
    pub staff_id: StaffId,
    pub student_id: StudentId,
    pub course_id: CourseId,
}

/// One student's assignment to one course offering taught by one staff
/// member, with its grading state.
///
/// Serializes with camelCase keys; this type is the wire shape of every
/// enrollment read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRecord {
    pub id: EnrollmentId,
    pub offering_id: CourseOfferingId,
    pub staff_id: StaffId,
    pub student_id: StudentId,
    pub course_id: CourseId,
    /// Set at creation, immutable afterwards.
    pub enrollment_date: DateTime<Utc>,
    pub status: EnrollmentStatus,
    pub marks: Option<f64>,
    pub grade: Option<LetterGrade>,
    pub gpa: Option<f64>,
    /// Attendance percentage, 0–100.
    pub attendance: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EnrollmentRecord {
    /// Create a fresh record for the given assignment.
    ///
    /// Status starts `Active` and attendance defaults to 0. The clock is
    /// passed in; records never read wall time themselves.
    pub fn new(key: EnrollmentKey, attendance: Option<f64>, now: DateTime<Utc>) -> Self {
        Self {
            id: EnrollmentId::new(),
            offering_id: key.offering_id,
            staff_id: key.staff_id,
            student_id: key.student_id,
            course_id: key.course_id,
            enrollment_date: now,
            status: EnrollmentStatus::Active,
            marks: None,
            grade: None,
            gpa: None,
            attendance: attendance.unwrap_or(0.0),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn key(&self) -> EnrollmentKey {
        EnrollmentKey {
            offering_id: self.offering_id,
            staff_id: self.staff_id,
            student_id: self.student_id,
            course_id: self.course_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> EnrollmentKey {
        EnrollmentKey {
            offering_id: CourseOfferingId::new(),
            staff_id: StaffId::new(),
            student_id: StudentId::new(),
            course_id: CourseId::new(),
        }
    }

    #[test]
    fn new_record_defaults() {
        let now = Utc::now();
        let record = EnrollmentRecord::new(key(), None, now);

        assert_eq!(record.status, EnrollmentStatus::Active);
        assert_eq!(record.attendance, 0.0);
        assert_eq!(record.marks, None);
        assert_eq!(record.grade, None);
        assert_eq!(record.gpa, None);
        assert_eq!(record.enrollment_date, now);
    }

    #[test]
    fn supplied_attendance_is_kept() {
        let record = EnrollmentRecord::new(key(), Some(75.0), Utc::now());
        assert_eq!(record.attendance, 75.0);
    }

    #[test]
    fn key_round_trips() {
        let k = key();
        let record = EnrollmentRecord::new(k, None, Utc::now());
        assert_eq!(record.key(), k);
    }

    #[test]
    fn grade_serde_uses_letter_forms() {
        assert_eq!(serde_json::to_string(&LetterGrade::AMinus).unwrap(), "\"A-\"");
        assert_eq!(
            serde_json::from_str::<LetterGrade>("\"B+\"").unwrap(),
            LetterGrade::BPlus
        );
        assert!(serde_json::from_str::<LetterGrade>("\"E\"").is_err());
    }

    #[test]
    fn status_parses_exact_names_only() {
        assert_eq!("Active".parse::<EnrollmentStatus>().unwrap(), EnrollmentStatus::Active);
        assert!("active".parse::<EnrollmentStatus>().is_err());
    }

    #[test]
    fn grade_parse_matches_display() {
        for grade in [
            LetterGrade::A,
            LetterGrade::AMinus,
            LetterGrade::BPlus,
            LetterGrade::B,
            LetterGrade::BMinus,
            LetterGrade::CPlus,
            LetterGrade::C,
            LetterGrade::CMinus,
            LetterGrade::D,
            LetterGrade::F,
            LetterGrade::P,
        ] {
            assert_eq!(grade.as_str().parse::<LetterGrade>().unwrap(), grade);
        }
    }
}
