use registrar_auth::{Role, SessionClaims};

/// Principal context for a request (decoded, verified token claims).
///
/// Attached by the auth middleware; downstream handlers trust it. The role
/// stays a string here: the gate is stateless and compares tags, it does
/// not re-resolve principals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    id: String,
    username: String,
    role: String,
    faculty: String,
}

impl PrincipalContext {
    pub fn from_claims(claims: &SessionClaims) -> Self {
        Self {
            id: claims.sub.clone(),
            username: claims.username.clone(),
            role: claims.role.clone(),
            faculty: claims.faculty.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn faculty(&self) -> &str {
        &self.faculty
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin.as_str()
    }
}
