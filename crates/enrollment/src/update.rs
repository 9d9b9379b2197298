use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use registrar_core::{DomainError, DomainResult};

use crate::record::{EnrollmentRecord, EnrollmentStatus, LetterGrade};

/// Partial update to the academic fields of an enrollment record.
///
/// Absent fields are left untouched. Grade and status are already narrowed
/// to their enumerations by deserialization; the numeric fields are
/// range-checked by [`validate`](Self::validate) before anything is
/// persisted. Marks, grade, and GPA are stored as independently supplied;
/// no consistency between them is derived or enforced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentUpdate {
    pub marks: Option<f64>,
    pub grade: Option<LetterGrade>,
    pub gpa: Option<f64>,
    pub attendance: Option<f64>,
    pub status: Option<EnrollmentStatus>,
}

impl EnrollmentUpdate {
    /// Range-check the numeric fields. Errors name the offending field.
    ///
    /// The `contains` checks also reject NaN.
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(marks) = self.marks {
            if !(0.0..=100.0).contains(&marks) {
                return Err(DomainError::validation("marks must be between 0 and 100"));
            }
        }
        if let Some(gpa) = self.gpa {
            if !(0.0..=4.0).contains(&gpa) {
                return Err(DomainError::validation("gpa must be between 0 and 4"));
            }
        }
        if let Some(attendance) = self.attendance {
            if !(0.0..=100.0).contains(&attendance) {
                return Err(DomainError::validation("attendance must be between 0 and 100"));
            }
        }
        Ok(())
    }

    /// Apply the update in place, bumping `updated_at`.
    ///
    /// Callers must have run [`validate`](Self::validate) first.
    pub fn apply(&self, record: &mut EnrollmentRecord, now: DateTime<Utc>) {
        if let Some(marks) = self.marks {
            record.marks = Some(marks);
        }
        if let Some(grade) = self.grade {
            record.grade = Some(grade);
        }
        if let Some(gpa) = self.gpa {
            record.gpa = Some(gpa);
        }
        if let Some(attendance) = self.attendance {
            record.attendance = attendance;
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        record.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EnrollmentKey;
    use registrar_core::{CourseId, CourseOfferingId, StaffId, StudentId};

    fn record() -> EnrollmentRecord {
        let key = EnrollmentKey {
            offering_id: CourseOfferingId::new(),
            staff_id: StaffId::new(),
            student_id: StudentId::new(),
            course_id: CourseId::new(),
        };
        EnrollmentRecord::new(key, None, Utc::now())
    }

    fn marks(value: f64) -> EnrollmentUpdate {
        EnrollmentUpdate {
            marks: Some(value),
            ..Default::default()
        }
    }

    #[test]
    fn out_of_range_marks_rejected() {
        assert!(marks(-1.0).validate().is_err());
        assert!(marks(101.0).validate().is_err());
    }

    #[test]
    fn boundary_values_accepted() {
        let update = EnrollmentUpdate {
            marks: Some(100.0),
            gpa: Some(4.0),
            attendance: Some(100.0),
            ..Default::default()
        };
        assert!(update.validate().is_ok());

        let update = EnrollmentUpdate {
            marks: Some(0.0),
            gpa: Some(0.0),
            attendance: Some(0.0),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
    }

    #[test]
    fn out_of_range_gpa_rejected() {
        let update = EnrollmentUpdate {
            gpa: Some(4.1),
            ..Default::default()
        };
        let err = update.validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("gpa")));
    }

    #[test]
    fn out_of_range_attendance_rejected() {
        let update = EnrollmentUpdate {
            attendance: Some(150.0),
            ..Default::default()
        };
        let err = update.validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("attendance")));
    }

    #[test]
    fn nan_is_rejected() {
        assert!(marks(f64::NAN).validate().is_err());
    }

    #[test]
    fn apply_sets_only_present_fields() {
        let mut rec = record();
        let before = rec.clone();

        let update = EnrollmentUpdate {
            marks: Some(87.5),
            grade: Some(LetterGrade::AMinus),
            ..Default::default()
        };
        let now = Utc::now();
        update.apply(&mut rec, now);

        assert_eq!(rec.marks, Some(87.5));
        assert_eq!(rec.grade, Some(LetterGrade::AMinus));
        assert_eq!(rec.gpa, before.gpa);
        assert_eq!(rec.attendance, before.attendance);
        assert_eq!(rec.status, before.status);
        assert_eq!(rec.updated_at, now);
        assert_eq!(rec.enrollment_date, before.enrollment_date);
    }

    #[test]
    fn apply_can_complete_a_course() {
        let mut rec = record();
        let update = EnrollmentUpdate {
            marks: Some(95.0),
            grade: Some(LetterGrade::A),
            gpa: Some(4.0),
            attendance: Some(92.0),
            status: Some(EnrollmentStatus::Completed),
        };
        update.validate().unwrap();
        update.apply(&mut rec, Utc::now());

        assert_eq!(rec.status, EnrollmentStatus::Completed);
        assert_eq!(rec.attendance, 92.0);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: every in-range triple validates.
            #[test]
            fn in_range_values_validate(
                marks in 0.0f64..=100.0,
                gpa in 0.0f64..=4.0,
                attendance in 0.0f64..=100.0,
            ) {
                let update = EnrollmentUpdate {
                    marks: Some(marks),
                    gpa: Some(gpa),
                    attendance: Some(attendance),
                    ..Default::default()
                };
                prop_assert!(update.validate().is_ok());
            }

            /// Property: marks outside [0, 100] never validate.
            #[test]
            fn out_of_range_marks_never_validate(delta in 0.001f64..1000.0) {
                prop_assert!(marks(100.0 + delta).validate().is_err());
                prop_assert!(marks(0.0 - delta).validate().is_err());
            }
        }
    }
}
