//! Enrollment CRUD, bulk assignment, and per-principal reads.
//!
//! Every route here sits behind the bearer-token middleware; the mutating
//! routes are additionally admin-gated.

use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;

use registrar_core::{CourseId, CourseOfferingId, EnrollmentId, StaffId, StudentId};
use registrar_enrollment::{EnrollmentKey, EnrollmentStatus, EnrollmentUpdate};
use registrar_infra::{EnrollmentFilter, EnrollmentView, LedgerError};

use crate::app::AppServices;
use crate::authz;
use crate::context::PrincipalContext;
use crate::routes::{decode_body, json_failure, server_error};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_enrollments).post(create_enrollment))
        .route("/bulk-assign", post(bulk_assign))
        .route(
            "/:id",
            get(get_enrollment).put(update_enrollment).delete(delete_enrollment),
        )
        .route("/student/:student_id", get(student_enrollments))
        .route("/staff/:staff_id", get(staff_enrollments))
}

fn ledger_error_response(context: &str, err: LedgerError) -> Response {
    match err {
        LedgerError::DuplicateCombination => json_failure(
            StatusCode::CONFLICT,
            "This student-course-staff combination already exists",
        ),
        LedgerError::NotFound => {
            json_failure(StatusCode::NOT_FOUND, "Enrollment record not found")
        }
        LedgerError::Validation(e) => json_failure(StatusCode::BAD_REQUEST, e.to_string()),
        LedgerError::Store(e) => server_error(context, e),
    }
}

fn listing(views: Vec<EnrollmentView>) -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "success": true,
            "count": views.len(),
            "data": views,
        })),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    student_id: Option<StudentId>,
    staff_id: Option<StaffId>,
    offering_id: Option<CourseOfferingId>,
    status: Option<EnrollmentStatus>,
}

async fn list_enrollments(
    Extension(services): Extension<AppServices>,
    Query(query): Query<ListQuery>,
) -> Response {
    let filter = EnrollmentFilter {
        student_id: query.student_id,
        staff_id: query.staff_id,
        offering_id: query.offering_id,
        status: query.status,
    };
    match services.ledger.list(&filter).await {
        Ok(views) => listing(views),
        Err(e) => ledger_error_response("enrollment list failed", e),
    }
}

async fn get_enrollment(
    Extension(services): Extension<AppServices>,
    Path(id): Path<String>,
) -> Response {
    let id: EnrollmentId = match id.parse() {
        Ok(id) => id,
        Err(_) => return json_failure(StatusCode::BAD_REQUEST, "Invalid enrollment id"),
    };
    match services.ledger.get(id).await {
        Ok(view) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "data": view })),
        )
            .into_response(),
        Err(e) => ledger_error_response("enrollment fetch failed", e),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateEnrollmentRequest {
    offering_id: CourseOfferingId,
    staff_id: StaffId,
    student_id: StudentId,
    course_id: CourseId,
    attendance: Option<f64>,
}

async fn create_enrollment(
    Extension(services): Extension<AppServices>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    if let Err(resp) = authz::require_admin(&principal) {
        return resp;
    }

    let req: CreateEnrollmentRequest = match decode_body(body) {
        Ok(req) => req,
        Err(msg) => return json_failure(StatusCode::BAD_REQUEST, msg),
    };

    let key = EnrollmentKey {
        offering_id: req.offering_id,
        staff_id: req.staff_id,
        student_id: req.student_id,
        course_id: req.course_id,
    };
    match services.ledger.create(key, req.attendance, Utc::now()).await {
        Ok(record) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "success": true,
                "message": "Enrollment record created successfully",
                "data": record,
            })),
        )
            .into_response(),
        Err(e) => ledger_error_response("enrollment create failed", e),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkAssignRequest {
    offering_id: CourseOfferingId,
    staff_id: StaffId,
    course_id: CourseId,
    student_ids: Vec<StudentId>,
}

async fn bulk_assign(
    Extension(services): Extension<AppServices>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    if let Err(resp) = authz::require_admin(&principal) {
        return resp;
    }

    let req: BulkAssignRequest = match decode_body(body) {
        Ok(req) => req,
        Err(msg) => return json_failure(StatusCode::BAD_REQUEST, msg),
    };

    match services
        .ledger
        .bulk_assign(
            req.offering_id,
            req.staff_id,
            req.course_id,
            &req.student_ids,
            Utc::now(),
        )
        .await
    {
        Ok(report) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "success": true,
                "message": format!("{} students assigned successfully", report.created.len()),
                "createdCount": report.created.len(),
                "errorCount": report.errors.len(),
                "errors": report.errors,
                "data": report.created,
            })),
        )
            .into_response(),
        Err(e) => ledger_error_response("bulk assignment failed", e),
    }
}

async fn update_enrollment(
    Extension(services): Extension<AppServices>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    if let Err(resp) = authz::require_admin(&principal) {
        return resp;
    }

    let id: EnrollmentId = match id.parse() {
        Ok(id) => id,
        Err(_) => return json_failure(StatusCode::BAD_REQUEST, "Invalid enrollment id"),
    };
    let update: EnrollmentUpdate = match decode_body(body) {
        Ok(update) => update,
        Err(msg) => return json_failure(StatusCode::BAD_REQUEST, msg),
    };

    match services.ledger.update(id, update, Utc::now()).await {
        Ok(record) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "message": "Enrollment record updated successfully",
                "data": record,
            })),
        )
            .into_response(),
        Err(e) => ledger_error_response("enrollment update failed", e),
    }
}

async fn delete_enrollment(
    Extension(services): Extension<AppServices>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authz::require_admin(&principal) {
        return resp;
    }

    let id: EnrollmentId = match id.parse() {
        Ok(id) => id,
        Err(_) => return json_failure(StatusCode::BAD_REQUEST, "Invalid enrollment id"),
    };
    match services.ledger.delete(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "message": "Enrollment record deleted successfully",
            })),
        )
            .into_response(),
        Err(e) => ledger_error_response("enrollment delete failed", e),
    }
}

async fn student_enrollments(
    Extension(services): Extension<AppServices>,
    Path(student_id): Path<String>,
) -> Response {
    let student_id: StudentId = match student_id.parse() {
        Ok(id) => id,
        Err(_) => return json_failure(StatusCode::BAD_REQUEST, "Invalid student id"),
    };
    match services.ledger.active_for_student(student_id).await {
        Ok(views) => listing(views),
        Err(e) => ledger_error_response("student enrollment read failed", e),
    }
}

async fn staff_enrollments(
    Extension(services): Extension<AppServices>,
    Path(staff_id): Path<String>,
) -> Response {
    let staff_id: StaffId = match staff_id.parse() {
        Ok(id) => id,
        Err(_) => return json_failure(StatusCode::BAD_REQUEST, "Invalid staff id"),
    };
    match services.ledger.active_for_staff(staff_id).await {
        Ok(views) => listing(views),
        Err(e) => ledger_error_response("staff enrollment read failed", e),
    }
}
