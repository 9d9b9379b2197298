//! Handler-side authorization guard.
//!
//! Enforced at the handler boundary (before any service call); the auth
//! middleware has already verified the token by the time this runs.

use axum::http::StatusCode;
use axum::response::Response;

use crate::context::PrincipalContext;
use crate::routes::json_message;

/// Restrict an operation to administrators.
///
/// Intended to be called **first** in handlers that mutate enrollment
/// records.
pub fn require_admin(principal: &PrincipalContext) -> Result<(), Response> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(json_message(
            StatusCode::FORBIDDEN,
            "Access denied: admin privileges required",
        ))
    }
}
