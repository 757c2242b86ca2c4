use std::{future::Future, pin::Pin, time::Duration};

use crate::services::cache::CacheError;

/// Read-only view of the shared revocation list (the "kill switch").
///
/// Revocation records are written by operator tooling with their own TTL;
/// this service only asks whether a token identifier is present.
///
/// - `Ok(true)`: the jti has been revoked
/// - `Ok(false)`: no revocation record
/// - `Err(_)`: backend failure; the caller applies `RevocationFailurePolicy`
pub trait RevocationStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    fn is_revoked<'a>(
        &'a self,
        jti: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<bool, RevocationError>> + Send + 'a>>;

    // Used by readiness checks.
    fn ping(&self) -> Pin<Box<dyn Future<Output = Result<(), RevocationError>> + Send + '_>>;
}

#[derive(Debug, thiserror::Error)]
pub enum RevocationError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("revocation lookup timed out after {0:?}")]
    Timeout(Duration),
}

/// What to do when the revocation store cannot answer.
///
/// `FailOpen` keeps serving (the token is treated as not revoked) and trades a
/// window of accepting a revoked token for availability during a store outage.
/// `FailClosed` rejects the request instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RevocationFailurePolicy {
    #[default]
    FailOpen,
    FailClosed,
}

impl std::str::FromStr for RevocationFailurePolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-open" | "fail_open" | "open" => Ok(Self::FailOpen),
            "fail-closed" | "fail_closed" | "closed" => Ok(Self::FailClosed),
            _ => Err(()),
        }
    }
}
