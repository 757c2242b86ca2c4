use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::AuthenticatedIdentity;

/// Extractor giving handlers the caller established by the auth gate.
///
/// The access middleware inserts `AuthenticatedIdentity` into the request
/// extensions. If it is missing the route was mounted without the middleware;
/// answer 401 rather than run the handler anonymously.
#[derive(Debug, Clone)]
pub struct Identity(pub AuthenticatedIdentity);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedIdentity>()
            .cloned()
            .map(Identity)
            .ok_or(AppError::Unauthorized {
                code: "MISSING_CREDENTIAL",
            })
    }
}
