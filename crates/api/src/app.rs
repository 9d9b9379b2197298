//! Router assembly and service wiring.

use std::sync::Arc;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;

use registrar_auth::{TokenIssuer, TokenVerifier};
use registrar_infra::{
    CredentialResolver, EnrollmentLedger, InMemoryAdminStore, InMemoryCatalogStore,
    InMemoryEnrollmentStore, InMemoryStaffStore, InMemoryStudentStore, PgAdminStore,
    PgCatalogStore, PgEnrollmentStore, PgStaffStore, PgStudentStore,
};
use sqlx::PgPool;

use crate::middleware::AuthState;
use crate::routes;

/// Shared application services, injected into every handler.
#[derive(Clone)]
pub struct AppServices {
    pub resolver: Arc<CredentialResolver>,
    pub ledger: Arc<EnrollmentLedger>,
}

/// In-memory wiring (dev/test): empty stores, no persistence.
pub fn build_in_memory_services(tokens: Arc<dyn TokenIssuer>) -> AppServices {
    let admins = Arc::new(InMemoryAdminStore::new());
    let students = Arc::new(InMemoryStudentStore::new());
    let staff = Arc::new(InMemoryStaffStore::new());
    let enrollments = Arc::new(InMemoryEnrollmentStore::new());
    let catalog = Arc::new(InMemoryCatalogStore::new());

    AppServices {
        resolver: Arc::new(CredentialResolver::new(
            admins,
            students.clone(),
            staff.clone(),
            tokens,
        )),
        ledger: Arc::new(EnrollmentLedger::new(enrollments, students, staff, catalog)),
    }
}

/// Postgres wiring: one pool shared across all stores.
pub async fn build_postgres_services(
    database_url: &str,
    tokens: Arc<dyn TokenIssuer>,
) -> anyhow::Result<AppServices> {
    let pool = PgPool::connect(database_url).await?;

    let admins = Arc::new(PgAdminStore::new(pool.clone()));
    let students = Arc::new(PgStudentStore::new(pool.clone()));
    let staff = Arc::new(PgStaffStore::new(pool.clone()));
    let enrollments = Arc::new(PgEnrollmentStore::new(pool.clone()));
    let catalog = Arc::new(PgCatalogStore::new(pool));

    Ok(AppServices {
        resolver: Arc::new(CredentialResolver::new(
            admins,
            students.clone(),
            staff.clone(),
            tokens,
        )),
        ledger: Arc::new(EnrollmentLedger::new(enrollments, students, staff, catalog)),
    })
}

/// Assemble the full router.
///
/// Login and signup are public; everything else under `/auth` and
/// `/enrollments` sits behind the bearer-token middleware.
pub fn build_app(services: AppServices, verifier: Arc<dyn TokenVerifier>) -> Router {
    let auth_state = AuthState { verifier };

    let protected = Router::new()
        .route("/auth/change-password", post(routes::auth::change_password))
        .nest("/enrollments", routes::enrollment::router())
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            crate::middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/signup", post(routes::auth::signup))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}

async fn health() -> StatusCode {
    StatusCode::OK
}
