//! Request authentication gate.
//!
//! Order of checks (each may reject):
//! 1. `Authorization: Bearer <token>` present
//! 2. unverified peek yields a non-empty `jti`
//! 3. claimed `exp` still in the future (no crypto spent on expired tokens)
//! 4. validation cache hit, or full signature verification which then fills the cache
//! 5. revocation list lookup, on every request including cache hits
//! 6. role membership
//!
//! Nothing is admitted before both the verification status and the revocation
//! state are known.

use std::{sync::Arc, time::Duration};

use axum::http::{HeaderMap, header};
use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::{debug, error, instrument, warn};

use crate::services::auth::{
    claims::{Claims, Role, TokenError, fingerprint, peek_claims},
    error::AuthError,
    identity::AuthenticatedIdentity,
    local_cache::LocalValidationCache,
    revocation::{RevocationError, RevocationFailurePolicy, RevocationStore},
    verifier::SignatureVerifier,
};

/// Default bound on a single revocation lookup.
pub const DEFAULT_REVOCATION_TIMEOUT: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy)]
pub struct RevocationSettings {
    pub failure_policy: RevocationFailurePolicy,
    pub timeout: Duration,
}

impl Default for RevocationSettings {
    fn default() -> Self {
        Self {
            failure_policy: RevocationFailurePolicy::FailOpen,
            timeout: DEFAULT_REVOCATION_TIMEOUT,
        }
    }
}

type VerifyOutcome = Result<Arc<Claims>, TokenError>;

pub struct AuthGate {
    verifier: Arc<dyn SignatureVerifier>,
    cache: Arc<LocalValidationCache>,
    revocation: Arc<dyn RevocationStore>,
    settings: RevocationSettings,
    // Cold verifications in progress, keyed by token fingerprint.
    in_flight: DashMap<String, Arc<OnceCell<VerifyOutcome>>>,
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("cached_tokens", &self.cache.len())
            .field("revocation_backend", &self.revocation.backend_name())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl AuthGate {
    pub fn new(
        verifier: Arc<dyn SignatureVerifier>,
        cache: Arc<LocalValidationCache>,
        revocation: Arc<dyn RevocationStore>,
        settings: RevocationSettings,
    ) -> Self {
        Self {
            verifier,
            cache,
            revocation,
            settings,
            in_flight: DashMap::new(),
        }
    }

    pub fn cache(&self) -> &Arc<LocalValidationCache> {
        &self.cache
    }

    pub fn revocation_store(&self) -> &dyn RevocationStore {
        self.revocation.as_ref()
    }

    /// Authenticate the request and check that its role is one of `allowed`.
    #[instrument(skip_all, fields(jti))]
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        allowed: &[Role],
    ) -> Result<AuthenticatedIdentity, AuthError> {
        let token = bearer_token(headers)?;

        let peeked = peek_claims(token).map_err(|e| {
            debug!(error = %e, "token could not be decoded");
            AuthError::MalformedToken
        })?;
        if peeked.jti.is_empty() {
            debug!("token has no jti");
            return Err(AuthError::MalformedToken);
        }
        tracing::Span::current().record("jti", peeked.jti.as_str());

        let now = chrono::Utc::now().timestamp();
        if peeked.exp <= now {
            return Err(AuthError::ExpiredCredential);
        }

        let claims = self.verified_claims(token, &peeked.jti, now).await?;

        self.check_revocation(&claims.jti).await?;

        let role = match claims.role() {
            Some(role) if allowed.contains(&role) => role,
            _ => {
                warn!(
                    role = claims.role.as_deref().unwrap_or("<none>"),
                    allowed = ?allowed,
                    "role not permitted"
                );
                return Err(AuthError::Forbidden);
            }
        };

        debug!(sub = %claims.sub, %role, "token accepted");

        Ok(AuthenticatedIdentity::new(
            claims.sub.clone(),
            role,
            claims.jti.clone(),
            token.to_string(),
        ))
    }

    /// Cached claims for this exact token, or the result of verifying it.
    async fn verified_claims(
        &self,
        token: &str,
        jti: &str,
        now: i64,
    ) -> Result<Arc<Claims>, AuthError> {
        let fp = fingerprint(token);

        if let Some(entry) = self.cache.lookup(jti, now) {
            if entry.fingerprint == fp {
                return Ok(entry.claims);
            }
            // Same jti, different bytes: never trust the cached verification.
            warn!("cached jti presented with a different token");
        }

        let cell = self.in_flight.entry(fp.clone()).or_default().clone();

        let outcome = cell
            .get_or_init(|| async {
                // Another request may have finished verifying this token while
                // we were waiting for the cell.
                if let Some(entry) = self.cache.lookup(jti, now) {
                    if entry.fingerprint == fp {
                        return Ok(entry.claims);
                    }
                }

                let verified = self.verifier.verify(token).map(Arc::new);
                if let Ok(claims) = &verified {
                    self.cache
                        .store(claims.jti.clone(), Arc::clone(claims), claims.exp, fp.clone());
                }
                verified
            })
            .await
            .clone();

        self.in_flight
            .remove_if(&fp, |_, current| Arc::ptr_eq(current, &cell));

        outcome.map_err(|e| {
            warn!(error = %e, "token verification failed");
            AuthError::from(e)
        })
    }

    async fn check_revocation(&self, jti: &str) -> Result<(), AuthError> {
        let timeout = self.settings.timeout;
        let outcome = tokio::time::timeout(timeout, self.revocation.is_revoked(jti))
            .await
            .unwrap_or(Err(RevocationError::Timeout(timeout)));

        match outcome {
            Ok(false) => Ok(()),
            Ok(true) => {
                warn!("rejected revoked token");
                Err(AuthError::RevokedCredential)
            }
            Err(e) => match self.settings.failure_policy {
                RevocationFailurePolicy::FailOpen => {
                    warn!(
                        error = %e,
                        backend = self.revocation.backend_name(),
                        "revocation check unavailable, admitting token (fail-open)"
                    );
                    Ok(())
                }
                RevocationFailurePolicy::FailClosed => {
                    error!(
                        error = %e,
                        backend = self.revocation.backend_name(),
                        "revocation check unavailable, rejecting token (fail-closed)"
                    );
                    Err(AuthError::UpstreamUnavailable)
                }
            },
        }
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively (RFC 6750).
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredential)?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or(AuthError::MissingCredential)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MissingCredential);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }
    Ok(token)
}
