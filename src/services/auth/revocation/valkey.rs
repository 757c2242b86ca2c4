use std::{future::Future, pin::Pin, sync::Arc};

use crate::services::{
    auth::revocation::store::{RevocationError, RevocationStore},
    cache::{CacheClient, ValkeyClient},
};

/// Valkey-backed revocation list (Redis protocol).
///
/// A revoked token is represented by the key `<prefix>:<jti>`; its value is
/// irrelevant and its TTL is set by whoever revoked it.
#[derive(Clone)]
pub struct ValkeyRevocationStore<C: CacheClient> {
    cache: Arc<C>,
    prefix: String,
}

impl ValkeyRevocationStore<ValkeyClient> {
    pub async fn new_with_prefix(
        redis_url: &str,
        prefix: impl Into<String>,
    ) -> Result<Self, RevocationError> {
        let client = ValkeyClient::new(redis_url).await?;

        Ok(Self {
            cache: Arc::new(client),
            prefix: prefix.into(),
        })
    }
}

impl<C: CacheClient> ValkeyRevocationStore<C> {
    pub fn new_with_cache(cache: Arc<C>, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
        }
    }

    pub fn key(&self, jti: &str) -> String {
        format!("{}:{}", self.prefix, jti)
    }
}

impl<C: CacheClient> RevocationStore for ValkeyRevocationStore<C> {
    fn backend_name(&self) -> &'static str {
        self.cache.backend_name()
    }

    fn is_revoked<'a>(
        &'a self,
        jti: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<bool, RevocationError>> + Send + 'a>> {
        Box::pin(async move {
            let key = self.key(jti);
            Ok(self.cache.exists(&key).await?)
        })
    }

    fn ping(&self) -> Pin<Box<dyn Future<Output = Result<(), RevocationError>> + Send + '_>> {
        Box::pin(async move { Ok(self.cache.ping().await?) })
    }
}
