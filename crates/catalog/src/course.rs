use serde::{Deserialize, Serialize};

use registrar_core::CourseId;

/// A course in the catalog (term-independent reference data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub id: CourseId,
    pub course_name: String,
    pub course_code: String,
    /// Credit hours / course units.
    pub credits: u32,
}
