//! Route handlers and shared request/response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;

pub mod auth;
pub mod enrollment;

/// Plain `{ "message": ... }` response at a given status.
pub fn json_message(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "message": message.into() })),
    )
        .into_response()
}

/// `{ "success": false, "message": ... }` envelope used by enrollment routes.
pub(crate) fn json_failure(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({
            "success": false,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Decode a request body, naming the offending field or value on failure.
///
/// Shape and enum errors become 400s (via the caller's envelope), not the
/// extractor's default 422.
pub(crate) fn decode_body<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, String> {
    serde_json::from_value(value).map_err(|e| format!("validation error: {e}"))
}

/// Log and mask a backend failure. Fatal to the request, never the process.
pub(crate) fn server_error(context: &str, detail: impl core::fmt::Display) -> Response {
    tracing::error!("{context}: {detail}");
    json_message(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
}
