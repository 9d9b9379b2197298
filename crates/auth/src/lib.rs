//! `registrar-auth` — pure authentication boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows how
//! to tag roles, shape and validate session claims, sign/verify tokens, and
//! hash/verify passwords. Who a set of credentials belongs to is decided
//! elsewhere.

pub mod claims;
pub mod password;
pub mod roles;
pub mod token;

pub use claims::{GLOBAL_FACULTY, SESSION_TTL_SECS, SessionClaims, TokenValidationError, validate_claims};
pub use password::{HashError, hash_password, verify_password};
pub use roles::{Role, UnknownRoleError};
pub use token::{Hs256TokenCodec, TokenError, TokenIssuer, TokenVerifier};
