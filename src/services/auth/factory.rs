/// Factory: build the authentication gate from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{
    gate::{AuthGate, RevocationSettings},
    local_cache::LocalValidationCache,
    revocation::{InMemoryRevocationStore, RevocationError, RevocationStore, ValkeyRevocationStore},
    verifier::RsaSignatureVerifier,
};

#[derive(Debug, thiserror::Error)]
pub enum GateBuildError {
    #[error("invalid RSA public key PEM: {0}")]
    PublicKey(#[from] jsonwebtoken::errors::Error),
    #[error("revocation store: {0}")]
    Revocation(#[from] RevocationError),
}

/// Build the gate around an externally owned validation cache.
///
/// The cache is passed in so the janitor can share the same instance.
pub async fn build_auth_gate(
    config: &Config,
    cache: Arc<LocalValidationCache>,
) -> Result<Arc<AuthGate>, GateBuildError> {
    let verifier = RsaSignatureVerifier::new(
        &config.public_key_pem,
        config.auth_issuer.as_deref(),
        config.auth_audience.as_deref(),
    )?;

    let revocation = build_revocation_store(config).await?;

    let settings = RevocationSettings {
        failure_policy: config.revocation_failure_policy,
        timeout: config.revocation_timeout,
    };

    tracing::info!(
        backend = revocation.backend_name(),
        failure_policy = ?settings.failure_policy,
        timeout_ms = settings.timeout.as_millis() as u64,
        "auth gate configured"
    );

    Ok(Arc::new(AuthGate::new(
        Arc::new(verifier),
        cache,
        revocation,
        settings,
    )))
}

async fn build_revocation_store(
    config: &Config,
) -> Result<Arc<dyn RevocationStore>, RevocationError> {
    match &config.valkey_url {
        Some(url) => {
            let store =
                ValkeyRevocationStore::new_with_prefix(url, config.revocation_key_prefix.clone())
                    .await?;
            Ok(Arc::new(store))
        }
        None => {
            // Config refuses this combination in production.
            tracing::warn!(
                "VALKEY_URL not set; using in-process revocation list (revocations are not shared)"
            );
            Ok(Arc::new(InMemoryRevocationStore::new()))
        }
    }
}
