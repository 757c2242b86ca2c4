#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use http_body_util::BodyExt;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
use tower::ServiceExt;

use media_service::app::build_router;
use media_service::repos::InMemoryVideoRepository;
use media_service::services::auth::{
    AuthGate, LocalValidationCache, RevocationSettings,
    revocation::{InMemoryRevocationStore, RevocationStore},
    verifier::RsaSignatureVerifier,
};
use media_service::state::{AppState, ServiceMeta};

pub const PRIVATE_KEY: &str = include_str!("../fixtures/signing_key.pem");
pub const PUBLIC_KEY: &str = include_str!("../fixtures/signing_key.pub.pem");
pub const ROGUE_KEY: &str = include_str!("../fixtures/rogue_key.pem");

pub struct TestApp {
    pub router: Router,
    pub cache: Arc<LocalValidationCache>,
}

impl TestApp {
    pub fn new() -> (Self, Arc<InMemoryRevocationStore>) {
        let store = Arc::new(InMemoryRevocationStore::new());
        let app = Self::with_store(store.clone(), RevocationSettings::default());
        (app, store)
    }

    pub fn with_store(store: Arc<dyn RevocationStore>, settings: RevocationSettings) -> Self {
        Self::build(store, settings, Duration::from_secs(5))
    }

    pub fn build(
        store: Arc<dyn RevocationStore>,
        settings: RevocationSettings,
        request_timeout: Duration,
    ) -> Self {
        let verifier = RsaSignatureVerifier::new(PUBLIC_KEY.as_bytes(), None, None)
            .expect("fixture public key parses");
        let cache = Arc::new(LocalValidationCache::new());
        let gate = Arc::new(AuthGate::new(
            Arc::new(verifier),
            cache.clone(),
            store,
            settings,
        ));

        let state = AppState::new(
            gate,
            Arc::new(InMemoryVideoRepository::new()),
            ServiceMeta {
                version: "test".to_string(),
                public_key_path: format!(
                    "{}/tests/fixtures/signing_key.pub.pem",
                    env!("CARGO_MANIFEST_DIR")
                ),
                started_at: Instant::now(),
            },
        );

        Self {
            router: build_router(state, request_timeout),
            cache,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request")
    }
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn token(sub: &str, role: &str, jti: &str) -> String {
    sign(
        PRIVATE_KEY,
        json!({"sub": sub, "role": role, "jti": jti, "iat": now(), "exp": now() + 600}),
    )
}

pub fn sign(private_pem: &str, claims: Value) -> String {
    let key = EncodingKey::from_rsa_pem(private_pem.as_bytes()).expect("fixture private key parses");
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key).expect("token signs")
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("Failed to build request")
}

pub fn post_json(uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

pub fn delete(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("Failed to build request")
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}
