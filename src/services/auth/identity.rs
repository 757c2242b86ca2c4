use crate::services::auth::claims::Role;

/// Caller identity established by the gate, attached to the request as a typed
/// extension for the rest of its handling.
#[derive(Clone)]
pub struct AuthenticatedIdentity {
    pub subject: String,
    pub role: Role,
    pub jti: String,
    token: String,
}

impl AuthenticatedIdentity {
    pub fn new(subject: String, role: Role, jti: String, token: String) -> Self {
        Self {
            subject,
            role,
            jti,
            token,
        }
    }

    /// The bearer token as presented, for handlers that forward it downstream.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for AuthenticatedIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the bearer token
        f.debug_struct("AuthenticatedIdentity")
            .field("subject", &self.subject)
            .field("role", &self.role)
            .field("jti", &self.jti)
            .finish_non_exhaustive()
    }
}
