use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use registrar_auth::TokenVerifier;

use crate::context::PrincipalContext;
use crate::routes::json_message;

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<dyn TokenVerifier>,
}

/// Bearer-token gate applied to every protected route.
///
/// A missing token is 401; a malformed, expired, or badly signed token is
/// 400. On success the decoded principal is attached to the request for
/// downstream handlers.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer(req.headers()) else {
        return json_message(StatusCode::UNAUTHORIZED, "Access denied: no token provided");
    };

    match state.verifier.verify(token, Utc::now()) {
        Ok(claims) => {
            req.extensions_mut()
                .insert(PrincipalContext::from_claims(&claims));
            next.run(req).await
        }
        Err(_) => json_message(StatusCode::BAD_REQUEST, "Invalid token"),
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
