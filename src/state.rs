/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 *   - auth gate (owns the validation cache + revocation store handles)
 *   - video repository
 *   - process metadata for health endpoints
 * - Cheap to Clone (everything inside is Arc/Copy)
 */
use std::sync::Arc;
use std::time::Instant;

use crate::repos::VideoRepository;
use crate::services::auth::AuthGate;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthGate>,
    pub videos: Arc<dyn VideoRepository>,
    pub meta: Arc<ServiceMeta>,
}

#[derive(Debug)]
pub struct ServiceMeta {
    pub version: String,
    pub public_key_path: String,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(auth: Arc<AuthGate>, videos: Arc<dyn VideoRepository>, meta: ServiceMeta) -> Self {
        Self {
            auth,
            videos,
            meta: Arc::new(meta),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("auth", &self.auth)
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}
