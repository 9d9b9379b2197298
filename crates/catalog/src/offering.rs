use serde::{Deserialize, Serialize};

use registrar_core::CourseOfferingId;

/// Academic term a course offering runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Semester {
    First,
    Second,
    Third,
}

/// A course offering: one course scheduled for one term/level within a
/// faculty and department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOfferingRecord {
    pub id: CourseOfferingId,
    pub course_name: String,
    pub course_code: String,
    pub semester: Semester,
    /// Level/year label (e.g. "Level 1").
    pub level: String,
    pub faculty: String,
    pub department: String,
}
