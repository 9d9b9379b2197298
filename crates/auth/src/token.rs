use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{SessionClaims, TokenValidationError, validate_claims};

/// Token-level error.
///
/// Verification failures are deliberately coarse: the caller only needs to
/// know a presented token is unusable, not which byte was wrong.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token encoding failed: {0}")]
    Encode(String),

    #[error("invalid token")]
    Invalid,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Issues signed session tokens from a claim set.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, claims: &SessionClaims) -> Result<String, TokenError>;
}

/// Verifies a presented token string back into session claims.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError>;
}

/// HMAC-SHA256 token codec over a server-held secret.
///
/// Claim-window validation is done by [`validate_claims`] against the caller's
/// clock rather than the JWT library's, so expiry behaves identically in
/// production and in tests.
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Hs256TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

impl TokenIssuer for Hs256TokenCodec {
    fn issue(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }
}

impl TokenVerifier for Hs256TokenCodec {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Invalid)?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use chrono::Duration;

    fn codec() -> Hs256TokenCodec {
        Hs256TokenCodec::new(b"test-secret")
    }

    #[test]
    fn issue_then_verify_round_trips() {
        let now = Utc::now();
        let claims = SessionClaims::new("id-1", "admin", Role::Admin, None, now);

        let token = codec().issue(&claims).unwrap();
        let decoded = codec().verify(&token, now).unwrap();

        assert_eq!(decoded, claims);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let now = Utc::now();
        let claims = SessionClaims::new("id-1", "admin", Role::Admin, None, now);
        let token = Hs256TokenCodec::new(b"other-secret").issue(&claims).unwrap();

        assert!(matches!(codec().verify(&token, now), Err(TokenError::Invalid)));
    }

    #[test]
    fn verify_rejects_expired() {
        let issued = Utc::now();
        let claims = SessionClaims::new("id-1", "admin", Role::Admin, None, issued);
        let token = codec().issue(&claims).unwrap();

        let later = issued + Duration::hours(2);
        assert!(matches!(
            codec().verify(&token, later),
            Err(TokenError::Claims(TokenValidationError::Expired))
        ));
    }

    #[test]
    fn verify_rejects_garbage() {
        assert!(matches!(
            codec().verify("not-a-token", Utc::now()),
            Err(TokenError::Invalid)
        ));
    }
}
