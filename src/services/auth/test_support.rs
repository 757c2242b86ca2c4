//! Token minting helpers for unit tests. The service itself never signs tokens.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Map, Value, json};

pub const PRIVATE_KEY_PEM: &str = include_str!("../../../tests/fixtures/signing_key.pem");
pub const PUBLIC_KEY_PEM: &str = include_str!("../../../tests/fixtures/signing_key.pub.pem");
pub const ROGUE_PRIVATE_KEY_PEM: &str = include_str!("../../../tests/fixtures/rogue_key.pem");

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[derive(Debug, Clone)]
pub struct TokenSpec {
    claims: Map<String, Value>,
}

impl TokenSpec {
    pub fn new(sub: &str, role: &str, jti: &str) -> Self {
        let mut claims = Map::new();
        claims.insert("sub".into(), json!(sub));
        claims.insert("role".into(), json!(role));
        claims.insert("jti".into(), json!(jti));
        claims.insert("iat".into(), json!(now()));
        claims.insert("exp".into(), json!(now() + 900));
        Self { claims }
    }

    pub fn expires_in(self, seconds: i64) -> Self {
        self.with("exp", json!(now() + seconds))
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.claims.insert(key.into(), value);
        self
    }

    pub fn without(mut self, key: &str) -> Self {
        self.claims.remove(key);
        self
    }

    pub fn claims(&self) -> Value {
        Value::Object(self.claims.clone())
    }
}

pub fn sign(spec: &TokenSpec) -> String {
    sign_with(PRIVATE_KEY_PEM, spec)
}

pub fn sign_with(private_key_pem: &str, spec: &TokenSpec) -> String {
    let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes()).unwrap();
    let mut header = Header::new(Algorithm::RS256);
    header.typ = Some("JWT".to_string());
    jsonwebtoken::encode(&header, &spec.claims(), &key).unwrap()
}

/// `alg: none` token with an empty signature segment.
pub fn unsigned(spec: &TokenSpec) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(spec.claims().to_string());
    format!("{header}.{payload}.")
}
