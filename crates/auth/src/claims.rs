use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Role;

/// Fixed session lifetime. There is no refresh or rotation; expiry is the
/// only cancellation mechanism.
pub const SESSION_TTL_SECS: i64 = 3600;

/// Faculty claim sentinel for principals that carry no faculty of their own.
pub const GLOBAL_FACULTY: &str = "Global";

/// Session claims model (transport-agnostic).
///
/// This is the full set of claims the API embeds in a token. The role travels
/// as a plain string: tokens are long-lived relative to deployments, and a
/// tag this process does not recognize must surface as an unknown-role
/// failure in the operations that dispatch on it, not as a decode error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject / principal identifier.
    pub sub: String,

    /// Login username of the principal.
    pub username: String,

    /// Resolved role tag ("admin" / "student" / "staff").
    pub role: String,

    /// Faculty of the principal, or [`GLOBAL_FACULTY`].
    pub faculty: String,

    /// Issued-at, seconds since the epoch.
    pub iat: i64,

    /// Expiration, seconds since the epoch.
    pub exp: i64,
}

impl SessionClaims {
    /// Build the claim set for a freshly resolved principal.
    ///
    /// `faculty` falls back to the [`GLOBAL_FACULTY`] sentinel when the
    /// principal has none.
    pub fn new(
        sub: impl Into<String>,
        username: impl Into<String>,
        role: Role,
        faculty: Option<&str>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: sub.into(),
            username: username.into(),
            role: role.as_str().to_string(),
            faculty: faculty.unwrap_or(GLOBAL_FACULTY).to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::seconds(SESSION_TTL_SECS)).timestamp(),
        }
    }

    /// Parse the role tag back into the closed role set.
    pub fn role(&self) -> Result<Role, crate::UnknownRoleError> {
        self.role.parse()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate session claims.
///
/// Note: this validates the *claims* only. Signature verification / decoding
/// lives in [`crate::token`].
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_at(issued_at: DateTime<Utc>) -> SessionClaims {
        SessionClaims::new("id-1", "alice", Role::Student, Some("Applied Science"), issued_at)
    }

    #[test]
    fn fresh_claims_are_valid() {
        let now = Utc::now();
        assert_eq!(validate_claims(&claims_at(now), now), Ok(()));
    }

    #[test]
    fn claims_expire_after_ttl() {
        let issued = Utc::now();
        let later = issued + Duration::seconds(SESSION_TTL_SECS + 1);
        assert_eq!(
            validate_claims(&claims_at(issued), later),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn future_claims_are_rejected() {
        let issued = Utc::now();
        let before = issued - Duration::minutes(5);
        assert_eq!(
            validate_claims(&claims_at(issued), before),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn inverted_window_is_rejected() {
        let now = Utc::now();
        let mut claims = claims_at(now);
        claims.exp = claims.iat;
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn faculty_falls_back_to_global() {
        let claims = SessionClaims::new("id-1", "admin", Role::Admin, None, Utc::now());
        assert_eq!(claims.faculty, GLOBAL_FACULTY);
        assert_eq!(claims.role().unwrap(), Role::Admin);
    }
}
