//! `registrar-enrollment` — the enrollment ledger's domain entity.
//!
//! An enrollment record is one student's assignment to one course offering
//! taught by one staff member. This crate contains the record, its
//! status/grade enumerations, and the validation applied to grade and
//! attendance updates, implemented purely as deterministic domain logic
//! (no IO, no HTTP, no storage).

pub mod record;
pub mod update;

pub use record::{EnrollmentKey, EnrollmentRecord, EnrollmentStatus, LetterGrade};
pub use update::EnrollmentUpdate;
