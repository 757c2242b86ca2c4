//! Bearer token check -> role check -> `AuthenticatedIdentity` in request extensions.
//!
//! The whole decision lives in [`AuthGate`]; this layer only adapts it to axum.
//! A rejected request never reaches the handler.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::auth::{AuthGate, Role};
use crate::state::AppState;

#[derive(Clone)]
struct RoleGuard {
    gate: Arc<AuthGate>,
    allowed: &'static [Role],
}

/// Protect every route in `router`, admitting only the given roles.
///
/// Example:
/// ```ignore
/// let admin = Router::new().route("/media/videos", post(create_video));
/// let admin = middleware::auth::access::apply(admin, &state, &[Role::Admin]);
/// ```
pub fn apply(
    router: Router<AppState>,
    state: &AppState,
    allowed: &'static [Role],
) -> Router<AppState> {
    let guard = RoleGuard {
        gate: Arc::clone(&state.auth),
        allowed,
    };
    // route_layer: unmatched paths still 404 instead of 401
    router.route_layer(middleware::from_fn_with_state(guard, access_middleware))
}

async fn access_middleware(
    State(guard): State<RoleGuard>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // Split so the body is not borrowed across the revocation await.
    let (mut parts, body) = req.into_parts();

    let identity = match guard.gate.authorize(&parts.headers, guard.allowed).await {
        Ok(identity) => identity,
        Err(err) => {
            tracing::warn!(
                code = err.code(),
                method = %parts.method,
                path = %parts.uri.path(),
                "request rejected by auth gate"
            );
            return Err(err.into());
        }
    };

    // middleware -> extractor hand-off
    parts.extensions.insert(identity);

    Ok(next.run(Request::from_parts(parts, body)).await)
}
