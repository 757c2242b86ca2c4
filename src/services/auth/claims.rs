//! Access-token claims and the unverified "peek" used to key the validation cache.
//!
//! Nothing returned by [`peek_claims`] is trustworthy: the signature has not been
//! checked. It only yields the cache key (`jti`) and the claimed expiry so that the
//! cheapest rejections can happen before any cryptography.

use std::{fmt, str::FromStr};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Tokens larger than this are rejected before decoding.
pub const MAX_TOKEN_SIZE_BYTES: usize = 8192;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(&'static str),
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("disallowed token algorithm: {0}")]
    DisallowedAlgorithm(String),
    #[error("token expired")]
    Expired,
    #[error("token rejected: {0}")]
    Rejected(&'static str),
}

/// Roles issued by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Parent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Parent => "PARENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    // Role names are compared exactly, as issued.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "PARENT" => Ok(Role::Parent),
            _ => Err(()),
        }
    }
}

/// Verified access-token claims.
///
/// `role` stays a string here: an unknown role is an authorization failure
/// (403), not a malformed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub role: Option<String>,
    pub jti: String,
    #[serde(deserialize_with = "numeric_date")]
    pub exp: i64,

    #[serde(
        default,
        deserialize_with = "optional_numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Value>,
}

impl Claims {
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(|r| r.parse().ok())
    }
}

/// Seconds from a NumericDate, which may be an integer or a float (truncated).
fn numeric_date_secs(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}

fn numeric_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    numeric_date_secs(&value).ok_or_else(|| D::Error::custom("expected a NumericDate"))
}

fn optional_numeric_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i64>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => numeric_date_secs(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom("expected a NumericDate")),
    }
}

// A non-string role is kept as "no role" so it ends in 403, not 401.
fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Result of decoding a token payload without verifying it.
#[derive(Debug, Clone)]
pub struct PeekedClaims {
    /// Empty when the claim is missing or not a string.
    pub jti: String,
    /// `0` when the claim is missing or not numeric.
    pub exp: i64,
    pub claims: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawHeader {
    #[serde(default)]
    alg: Option<String>,
}

/// Split a compact JWS into its three segments.
fn segments(token: &str) -> Result<[&str; 3], TokenError> {
    if token.len() > MAX_TOKEN_SIZE_BYTES {
        return Err(TokenError::Malformed("token exceeds size limit"));
    }

    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(p), Some(s), None) if !h.is_empty() && !p.is_empty() => Ok([h, p, s]),
        _ => Err(TokenError::Malformed("expected three dot-separated segments")),
    }
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, TokenError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed("segment is not base64url"))
}

/// Decode the claims payload without verifying the signature.
pub fn peek_claims(token: &str) -> Result<PeekedClaims, TokenError> {
    let [_, payload, _] = segments(token)?;
    let bytes = decode_segment(payload)?;

    let claims: Map<String, Value> = serde_json::from_slice(&bytes)
        .map_err(|_| TokenError::Malformed("payload is not a JSON object"))?;

    let jti = claims
        .get("jti")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    // `exp` is a NumericDate; some issuers emit it as a float.
    let exp = claims.get("exp").and_then(numeric_date_secs).unwrap_or(0);

    Ok(PeekedClaims { jti, exp, claims })
}

/// Read the `alg` header parameter as written, including values the JWT
/// library does not model (e.g. `none`).
pub fn peek_algorithm(token: &str) -> Result<String, TokenError> {
    let [header, _, _] = segments(token)?;
    let bytes = decode_segment(header)?;

    let header: RawHeader = serde_json::from_slice(&bytes)
        .map_err(|_| TokenError::Malformed("header is not a JSON object"))?;

    header
        .alg
        .ok_or(TokenError::Malformed("header has no alg"))
}

/// SHA-256 of the raw token, base64url encoded.
///
/// Binds a cache entry to the exact token that was verified, so another token
/// claiming the same `jti` cannot reuse the entry.
pub fn fingerprint(token: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(token.as_bytes()))
}
