//! End-to-end checks of the auth gate through the HTTP router.

mod common;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use common::*;
use media_service::services::auth::RevocationSettings;
use media_service::services::auth::revocation::{
    RevocationError, RevocationFailurePolicy, RevocationStore,
};
use media_service::services::cache::CacheError;

const VIDEOS: &str = "/api/v1/media/videos";

struct UnreachableStore;

impl RevocationStore for UnreachableStore {
    fn backend_name(&self) -> &'static str {
        "unreachable"
    }

    fn is_revoked<'a>(
        &'a self,
        _jti: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<bool, RevocationError>> + Send + 'a>> {
        Box::pin(async {
            Err(CacheError::BackendConnection("connection refused".into()).into())
        })
    }

    fn ping(&self) -> Pin<Box<dyn Future<Output = Result<(), RevocationError>> + Send + '_>> {
        Box::pin(async { Err(CacheError::BackendConnection("connection refused".into()).into()) })
    }
}

/// Answers "not revoked", but only after a long stall.
struct StallingStore {
    delay: Duration,
    answered: AtomicBool,
}

impl RevocationStore for StallingStore {
    fn backend_name(&self) -> &'static str {
        "stalling"
    }

    fn is_revoked<'a>(
        &'a self,
        _jti: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<bool, RevocationError>> + Send + 'a>> {
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            self.answered.store(true, Ordering::SeqCst);
            Ok(false)
        })
    }

    fn ping(&self) -> Pin<Box<dyn Future<Output = Result<(), RevocationError>> + Send + '_>> {
        Box::pin(async { Ok(()) })
    }
}

#[tokio::test]
async fn missing_header_is_unauthorized() {
    let (app, _) = TestApp::new();

    let response = app.send(get(VIDEOS, None)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["www-authenticate"], "Bearer");
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "MISSING_CREDENTIAL");
}

#[tokio::test]
async fn parent_can_list_videos() {
    let (app, _) = TestApp::new();
    let token = token("parent-1", "PARENT", "jti-list");

    let response = app.send(get(VIDEOS, Some(&token))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let body = json_body(response).await;
    assert_eq!(body["videos"], json!([]));
    assert_eq!(app.cache.len(), 1);
}

#[tokio::test]
async fn parent_cannot_create_videos() {
    let (app, _) = TestApp::new();
    let token = token("parent-1", "PARENT", "jti-parent-write");

    let response = app
        .send(post_json(
            VIDEOS,
            &token,
            json!({"url": "https://cdn.example/a.mp4", "content_type": "SLEEPING"}),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_creates_reads_and_deletes_a_video() {
    let (app, _) = TestApp::new();
    let admin = token("admin-1", "ADMIN", "jti-admin");
    let parent = token("parent-1", "PARENT", "jti-parent");

    let response = app
        .send(post_json(
            VIDEOS,
            &admin,
            json!({
                "url": "https://cdn.example/a.mp4",
                "content_type": "SLEEPING",
                "description": "first"
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    let id = created["id"].as_str().expect("id is a string").to_string();
    assert_eq!(created["content_type"], "SLEEPING");

    let uri = format!("{VIDEOS}/{id}");
    let response = app.send(get(&uri, Some(&parent))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["description"], "first");

    let response = app.send(delete(&uri, &parent)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.send(delete(&uri, &admin)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.send(get(&uri, Some(&parent))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_body_is_bad_request() {
    let (app, _) = TestApp::new();
    let admin = token("admin-1", "ADMIN", "jti-bad-body");

    let response = app
        .send(post_json(VIDEOS, &admin, json!({"url": "", "content_type": "SLEEPING"})))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn expired_token_is_rejected_without_caching() {
    let (app, _) = TestApp::new();
    let token = sign(
        PRIVATE_KEY,
        json!({"sub": "u", "role": "ADMIN", "jti": "jti-old", "exp": now() - 10}),
    );

    let response = app.send(get(VIDEOS, Some(&token))).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"]["code"], "EXPIRED_CREDENTIAL");
    assert!(app.cache.is_empty());
}

#[tokio::test]
async fn token_from_unknown_key_is_rejected() {
    let (app, _) = TestApp::new();
    let token = sign(
        ROGUE_KEY,
        json!({"sub": "u", "role": "ADMIN", "jti": "jti-rogue", "exp": now() + 600}),
    );

    let response = app.send(get(VIDEOS, Some(&token))).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"]["code"], "INVALID_SIGNATURE");
}

#[tokio::test]
async fn revocation_applies_to_cached_tokens() {
    let (app, store) = TestApp::new();
    let token = token("parent-1", "PARENT", "jti-revoke-me");

    let response = app.send(get(VIDEOS, Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);

    store.revoke("jti-revoke-me");

    let response = app.send(get(VIDEOS, Some(&token))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"]["code"], "REVOKED_CREDENTIAL");
}

#[tokio::test]
async fn store_outage_fails_open_by_default() {
    let app = TestApp::with_store(Arc::new(UnreachableStore), RevocationSettings::default());
    let token = token("parent-1", "PARENT", "jti-open");

    let response = app.send(get(VIDEOS, Some(&token))).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn store_outage_fails_closed_when_configured() {
    let settings = RevocationSettings {
        failure_policy: RevocationFailurePolicy::FailClosed,
        ..RevocationSettings::default()
    };
    let app = TestApp::with_store(Arc::new(UnreachableStore), settings);
    let token = token("parent-1", "PARENT", "jti-closed");

    let response = app.send(get(VIDEOS, Some(&token))).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["error"]["code"], "UPSTREAM_UNAVAILABLE");
}

#[tokio::test]
async fn health_endpoints_bypass_the_gate() {
    let (app, _) = TestApp::new();

    let response = app.send(get("/health/live", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.send(get("/health/ready", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.send(get("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "UP");
    assert_eq!(body["version"], "test");
    assert_eq!(body["checks"]["revocation_store"]["status"], "UP");
}

#[tokio::test]
async fn health_reports_down_when_store_unreachable() {
    let app = TestApp::with_store(Arc::new(UnreachableStore), RevocationSettings::default());

    let response = app.send(get("/health/ready", None)).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = app.send(get("/health", None)).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["checks"]["revocation_store"]["status"], "DOWN");
}

#[tokio::test]
async fn request_dropped_while_awaiting_revocation_is_not_admitted() {
    let store = Arc::new(StallingStore {
        delay: Duration::from_secs(10),
        answered: AtomicBool::new(false),
    });
    // The gate would wait far longer than the request is allowed to live.
    let settings = RevocationSettings {
        failure_policy: RevocationFailurePolicy::FailOpen,
        timeout: Duration::from_secs(30),
    };
    let app = TestApp::build(store.clone(), settings, Duration::from_millis(100));
    let token = token("parent-1", "PARENT", "jti-stalled");

    let started = std::time::Instant::now();
    let response = app.send(get(VIDEOS, Some(&token))).await;

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(!store.answered.load(Ordering::SeqCst));
    // verification finished before the stall; only the admission was cut off
    assert_eq!(app.cache.len(), 1);
}
