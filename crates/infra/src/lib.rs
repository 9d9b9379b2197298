//! `registrar-infra` — storage and application services.
//!
//! Storage is abstracted behind async traits with two implementations: an
//! in-memory one for tests/dev and a Postgres one for production. On top of
//! the stores sit the two application services: the [`CredentialResolver`]
//! (who is this caller, and what token do they get) and the
//! [`EnrollmentLedger`] (assignment records and their grading state).

pub mod ledger;
pub mod resolver;
pub mod store;

pub use ledger::{
    BulkAssignFailure, BulkAssignReport, CourseSummary, EnrollmentLedger, EnrollmentView,
    LedgerError, OfferingSummary, StaffSummary, StudentSummary,
};
pub use resolver::{AuthError, CredentialResolver, LoginOutcome};
pub use store::{
    AdminStore, CatalogStore, EnrollmentFilter, EnrollmentStore, StaffStore, StoreError,
    StudentStore,
    memory::{
        InMemoryAdminStore, InMemoryCatalogStore, InMemoryEnrollmentStore, InMemoryStaffStore,
        InMemoryStudentStore,
    },
    postgres::{PgAdminStore, PgCatalogStore, PgEnrollmentStore, PgStaffStore, PgStudentStore},
};
