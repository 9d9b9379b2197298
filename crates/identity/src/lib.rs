//! `registrar-identity` — principal record types.
//!
//! Administrators, students, and staff live in three administratively
//! separate collections with no shared base type. The [`Principal`] tagged
//! union is the single interface the credential resolver works against.

pub mod admin;
pub mod principal;
pub mod staff;
pub mod student;

pub use admin::AdminRecord;
pub use principal::Principal;
pub use staff::StaffRecord;
pub use student::{NewStudent, StudentRecord};
