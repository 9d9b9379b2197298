//! `registrar-catalog` — course reference data.
//!
//! Courses and course offerings are managed by an external catalog system;
//! this crate only models the records enrollment reads resolve into summary
//! views.

pub mod course;
pub mod offering;

pub use course::CourseRecord;
pub use offering::{CourseOfferingRecord, Semester};
