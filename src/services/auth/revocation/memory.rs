use std::{future::Future, pin::Pin};

use dashmap::DashSet;

use crate::services::auth::revocation::store::{RevocationError, RevocationStore};

/// Process-local revocation list.
///
/// Used in development when no Valkey URL is configured, and by tests that
/// need to revoke a token mid-flight. Revocations are not shared across
/// instances and do not expire.
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    revoked: DashSet<String>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revoke(&self, jti: impl Into<String>) {
        self.revoked.insert(jti.into());
    }

    pub fn reinstate(&self, jti: &str) {
        self.revoked.remove(jti);
    }
}

impl RevocationStore for InMemoryRevocationStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn is_revoked<'a>(
        &'a self,
        jti: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<bool, RevocationError>> + Send + 'a>> {
        Box::pin(async move { Ok(self.revoked.contains(jti)) })
    }

    fn ping(&self) -> Pin<Box<dyn Future<Output = Result<(), RevocationError>> + Send + '_>> {
        Box::pin(async { Ok(()) })
    }
}
