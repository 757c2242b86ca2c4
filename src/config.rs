/*
 * Responsibility
 * - Load settings from environment variables (.env supported via dotenvy)
 * - Validate them up front: a bad value fails startup instead of a request
 * - Load the identity provider's public key PEM from disk
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::auth::janitor::DEFAULT_SWEEP_INTERVAL_SECONDS;
use crate::services::auth::revocation::RevocationFailurePolicy;

const DEFAULT_PORT: u16 = 8081;
const DEFAULT_PUBLIC_KEY_PATH: &str = "/etc/certs/public.pem";
const DEFAULT_REVOCATION_KEY_PREFIX: &str = "blacklist";
const DEFAULT_REVOCATION_TIMEOUT_MS: u64 = 250;
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
    Unreadable {
        key: &'static str,
        source: std::io::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
            ConfigError::Unreadable { key, source } => {
                write!(f, "cannot read file for {}: {}", key, source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Unreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub app_version: String,
    pub request_timeout: Duration,

    pub public_key_path: String,
    pub public_key_pem: Vec<u8>,
    pub auth_issuer: Option<String>,
    pub auth_audience: Option<String>,

    // None: use the in-process revocation list (development only).
    pub valkey_url: Option<String>,
    pub revocation_key_prefix: String,
    pub revocation_timeout: Duration,
    pub revocation_failure_policy: RevocationFailurePolicy,

    pub cache_sweep_interval: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // valkey_url may embed a password
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("public_key_path", &self.public_key_path)
            .field("auth_issuer", &self.auth_issuer)
            .field("auth_audience", &self.auth_audience)
            .field("valkey_configured", &self.valkey_url.is_some())
            .field("revocation_failure_policy", &self.revocation_failure_policy)
            .finish_non_exhaustive()
    }
}

/// Parse an optional variable; unset means `default`, set-but-unparsable is an error.
fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

// Durations and intervals: zero would stall or reject every request.
fn parse_positive(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match parse_or(key, default)? {
        0 => Err(ConfigError::Invalid(key)),
        value => Ok(value),
    }
}

fn non_empty(key: &'static str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = parse_or("PORT", DEFAULT_PORT)?;
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let app_env = AppEnv::from_env();
        let app_version = non_empty("APP_VERSION").unwrap_or_else(|| "unknown".to_string());

        let request_timeout = Duration::from_secs(parse_positive(
            "REQUEST_TIMEOUT_SECONDS",
            DEFAULT_REQUEST_TIMEOUT_SECONDS,
        )?);

        let public_key_path =
            non_empty("PUBLIC_KEY_PATH").unwrap_or_else(|| DEFAULT_PUBLIC_KEY_PATH.to_string());
        let public_key_pem =
            std::fs::read(&public_key_path).map_err(|source| ConfigError::Unreadable {
                key: "PUBLIC_KEY_PATH",
                source,
            })?;

        let valkey_url = non_empty("VALKEY_URL");
        if valkey_url.is_none() && app_env.is_production() {
            return Err(ConfigError::Missing("VALKEY_URL"));
        }

        let revocation_key_prefix = non_empty("REVOCATION_KEY_PREFIX")
            .unwrap_or_else(|| DEFAULT_REVOCATION_KEY_PREFIX.to_string());

        let revocation_timeout = Duration::from_millis(parse_positive(
            "REVOCATION_TIMEOUT_MS",
            DEFAULT_REVOCATION_TIMEOUT_MS,
        )?);

        let revocation_failure_policy =
            parse_or("REVOCATION_FAILURE_POLICY", RevocationFailurePolicy::default())?;

        let sweep_seconds =
            parse_positive("CACHE_SWEEP_INTERVAL_SECONDS", DEFAULT_SWEEP_INTERVAL_SECONDS)?;

        Ok(Self {
            addr,
            app_env,
            app_version,
            request_timeout,
            public_key_path,
            public_key_pem,
            auth_issuer: non_empty("AUTH_ISSUER"),
            auth_audience: non_empty("AUTH_AUDIENCE"),
            valkey_url,
            revocation_key_prefix,
            revocation_timeout,
            revocation_failure_policy,
            cache_sweep_interval: Duration::from_secs(sweep_seconds),
        })
    }
}
