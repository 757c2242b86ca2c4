use thiserror::Error;

use crate::services::auth::claims::TokenError;

/// Why the gate refused a request. Every variant is terminal for that request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing or malformed authorization header")]
    MissingCredential,
    #[error("malformed token")]
    MalformedToken,
    #[error("token expired")]
    ExpiredCredential,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token claims rejected")]
    InvalidCredential,
    #[error("token revoked")]
    RevokedCredential,
    #[error("role not permitted")]
    Forbidden,
    #[error("revocation store unavailable")]
    UpstreamUnavailable,
}

impl AuthError {
    /// Short machine-readable code for logs and error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "MISSING_CREDENTIAL",
            AuthError::MalformedToken => "MALFORMED_TOKEN",
            AuthError::ExpiredCredential => "EXPIRED_CREDENTIAL",
            AuthError::InvalidSignature => "INVALID_SIGNATURE",
            AuthError::InvalidCredential => "INVALID_CREDENTIAL",
            AuthError::RevokedCredential => "REVOKED_CREDENTIAL",
            AuthError::Forbidden => "FORBIDDEN",
            AuthError::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Malformed(_) => AuthError::MalformedToken,
            TokenError::InvalidSignature | TokenError::DisallowedAlgorithm(_) => {
                AuthError::InvalidSignature
            }
            TokenError::Expired => AuthError::ExpiredCredential,
            TokenError::Rejected(_) => AuthError::InvalidCredential,
        }
    }
}
