/*
 * Responsibility
 * - GET /health        overall status with per-dependency checks
 * - GET /health/live   liveness probe (process is up)
 * - GET /health/ready  readiness probe (revocation store reachable)
 * - Mounted outside the auth gate
 */
use std::collections::BTreeMap;
use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::json;

use crate::state::AppState;

const DEPENDENCY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub uptime: String,
    pub version: String,
    pub checks: BTreeMap<&'static str, Check>,
}

#[derive(Debug, Serialize)]
pub struct Check {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Check {
    fn up(message: Option<String>) -> Self {
        Self {
            status: "UP",
            message,
        }
    }

    fn down(message: impl Into<String>) -> Self {
        Self {
            status: "DOWN",
            message: Some(message.into()),
        }
    }

    fn is_up(&self) -> bool {
        self.status == "UP"
    }
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let mut checks = BTreeMap::new();
    checks.insert("revocation_store", check_revocation_store(&state).await);
    checks.insert("public_key", check_public_key(&state.meta.public_key_path));
    checks.insert(
        "token_cache",
        Check::up(Some(format!("{} entries", state.auth.cache().len()))),
    );

    let healthy = checks.values().all(Check::is_up);
    let (status, http_status) = if healthy {
        ("UP", StatusCode::OK)
    } else {
        ("DOWN", StatusCode::SERVICE_UNAVAILABLE)
    };

    let body = HealthResponse {
        status,
        timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        uptime: format_uptime(state.meta.started_at.elapsed()),
        version: state.meta.version.clone(),
        checks,
    };

    (http_status, Json(body))
}

pub async fn live() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "UP"})))
}

pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let check = check_revocation_store(&state).await;
    if check.is_up() {
        (StatusCode::OK, Json(json!({"status": "UP"})))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "DOWN", "message": "Revocation store not ready"})),
        )
    }
}

async fn check_revocation_store(state: &AppState) -> Check {
    let store = state.auth.revocation_store();
    match tokio::time::timeout(DEPENDENCY_TIMEOUT, store.ping()).await {
        Ok(Ok(())) => Check::up(Some(store.backend_name().to_string())),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "revocation store health check failed");
            Check::down("Cannot reach revocation store")
        }
        Err(_) => Check::down("Revocation store health check timed out"),
    }
}

// The key is parsed once at startup; this reports whether the file is still
// in place for the next restart.
fn check_public_key(path: &str) -> Check {
    if std::path::Path::new(path).is_file() {
        Check::up(None)
    } else {
        Check::down("Public key file not found")
    }
}

fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}h{m}m{s}s")
    } else if m > 0 {
        format!("{m}m{s}s")
    } else {
        format!("{s}s")
    }
}
