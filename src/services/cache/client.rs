//! Cache client interface used by higher-level services (token revocation, health checks).
use async_trait::async_trait;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-layer errors (transport/command).
///
/// Note:
/// - Kept independent from `AppError` so callers can decide how to fail
///   (the revocation check applies its own fail-open / fail-closed policy).
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
}

/// A minimal, read-mostly cache interface.
///
/// The revocation check only needs key existence. Writes to the revocation
/// namespace are done by the operator tooling, never by this service.
///
/// Implementations must be cheap to clone (typically `Arc<...>` inside).
#[async_trait]
pub trait CacheClient: Clone + Send + Sync + 'static {
    // Returns the cache backend name (for logging/health output).
    fn backend_name(&self) -> &'static str;

    // Returns true when `key` exists.
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    // Round-trip to the backend; used by readiness checks.
    async fn ping(&self) -> CacheResult<()>;
}
