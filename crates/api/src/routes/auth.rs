//! Login, signup, and password-change handlers.

use axum::Json;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;

use registrar_identity::NewStudent;
use registrar_infra::AuthError;

use crate::app::AppServices;
use crate::context::PrincipalContext;
use crate::routes::{decode_body, json_message, server_error};

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
    faculty: Option<String>,
}

pub async fn login(
    Extension(services): Extension<AppServices>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let req: LoginRequest = match decode_body(body) {
        Ok(req) => req,
        Err(msg) => return json_message(StatusCode::BAD_REQUEST, msg),
    };

    // An empty faculty string means "no hint", same as an absent field.
    let faculty_hint = req.faculty.as_deref().filter(|f| !f.trim().is_empty());

    match services
        .resolver
        .login(&req.username, &req.password, faculty_hint, Utc::now())
        .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Login successful",
                "token": outcome.token,
                "user": {
                    "id": outcome.claims.sub,
                    "username": outcome.claims.username,
                    "role": outcome.claims.role,
                },
            })),
        )
            .into_response(),
        // One generic message for both not-found and bad-password: the
        // login surface must not confirm which usernames exist.
        Err(AuthError::PrincipalNotFound | AuthError::InvalidCredentials) => {
            json_message(StatusCode::BAD_REQUEST, "Invalid username or password")
        }
        Err(e) => server_error("login failed", e),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignupRequest {
    reg_number: String,
    full_name: String,
    enroll_date: Option<String>,
    index_number: Option<String>,
    academic_year: Option<String>,
    faculty: String,
    username: String,
    password: String,
}

pub async fn signup(
    Extension(services): Extension<AppServices>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let req: SignupRequest = match decode_body(body) {
        Ok(req) => req,
        Err(msg) => return json_message(StatusCode::BAD_REQUEST, msg),
    };

    let signup = NewStudent {
        reg_number: req.reg_number,
        name: req.full_name,
        enrollment_date: req.enroll_date,
        index_number: req.index_number,
        academic_year: req.academic_year,
        faculty: req.faculty,
        username: req.username,
        password: req.password,
    };

    match services.resolver.signup(signup).await {
        Ok(_id) => json_message(StatusCode::CREATED, "Signup successful"),
        Err(AuthError::DuplicateUsername) => {
            json_message(StatusCode::BAD_REQUEST, "Username already exists")
        }
        Err(AuthError::Validation(e)) => json_message(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e) => server_error("signup failed", e),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}

pub async fn change_password(
    Extension(services): Extension<AppServices>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let req: ChangePasswordRequest = match decode_body(body) {
        Ok(req) => req,
        Err(msg) => return json_message(StatusCode::BAD_REQUEST, msg),
    };

    match services
        .resolver
        .change_password(
            principal.id(),
            principal.role(),
            &req.current_password,
            &req.new_password,
        )
        .await
    {
        Ok(()) => json_message(StatusCode::OK, "Password changed successfully"),
        Err(AuthError::PrincipalNotFound) => {
            json_message(StatusCode::NOT_FOUND, "User not found")
        }
        Err(AuthError::InvalidCurrentPassword) => {
            json_message(StatusCode::BAD_REQUEST, "Invalid current password")
        }
        Err(AuthError::UnknownRole(role)) => {
            json_message(StatusCode::BAD_REQUEST, format!("Unknown role: {role}"))
        }
        Err(AuthError::Validation(e)) => json_message(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e) => server_error("change-password failed", e),
    }
}
