//! Environment-driven configuration.
//!
//! Every setting is read once at startup. Malformed values panic there,
//! never at request time.

use std::fmt::Debug;
use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// `key` parsed as `T`, or `default` when unset.
///
/// # Panics
///
/// Panics when the variable is set but does not parse.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Debug,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} has an invalid value '{raw}': {e:?}")),
        Err(_) => default,
    }
}

/// `key` when set to something non-blank.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_string(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

impl JwtConfig {
    /// | Env Var                    | Default  |
    /// |----------------------------|----------|
    /// | `JWT_SECRET`               | required |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | `15`     |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | `7`      |
    pub fn from_env() -> Self {
        Self {
            secret: env_opt("JWT_SECRET").expect("JWT_SECRET must be set and non-empty"),
            access_token_expiry_mins: env_or("JWT_ACCESS_EXPIRY_MINS", 15),
            refresh_token_expiry_days: env_or("JWT_REFRESH_EXPIRY_DAYS", 7),
        }
    }
}

/// Which object store backs catalog materials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Files under a local directory. Development and tests.
    Local,
    /// An S3 bucket with presigned URLs.
    S3,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "s3" => Ok(Self::S3),
            other => Err(format!("expected 'local' or 's3', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Root directory for [`StorageBackend::Local`].
    pub local_root: String,
    /// Bucket for [`StorageBackend::S3`].
    pub s3_bucket: Option<String>,
    /// Lifetime of presigned URLs in seconds.
    pub presign_expiry_secs: u64,
}

impl StorageConfig {
    /// | Env Var                       | Default     |
    /// |-------------------------------|-------------|
    /// | `STORAGE_BACKEND`             | `local`     |
    /// | `STORAGE_LOCAL_ROOT`          | `./storage` |
    /// | `STORAGE_S3_BUCKET`           | --          |
    /// | `STORAGE_PRESIGN_EXPIRY_SECS` | `900`       |
    ///
    /// # Panics
    ///
    /// Panics when `s3` is chosen without a bucket.
    pub fn from_env() -> Self {
        let backend = env_or("STORAGE_BACKEND", StorageBackend::Local);
        let s3_bucket = env_opt("STORAGE_S3_BUCKET");
        assert!(
            backend != StorageBackend::S3 || s3_bucket.is_some(),
            "STORAGE_S3_BUCKET must be set when STORAGE_BACKEND=s3"
        );
        Self {
            backend,
            local_root: env_string("STORAGE_LOCAL_ROOT", "./storage"),
            s3_bucket,
            presign_expiry_secs: env_or("STORAGE_PRESIGN_EXPIRY_SECS", 900),
        }
    }
}

/// Settings for the quiz-drafting model endpoint.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_url: String,
    /// Without a key the template generator is used.
    pub api_key: Option<String>,
    pub model: String,
}

impl AiConfig {
    /// | Env Var      | Default                                  |
    /// |--------------|------------------------------------------|
    /// | `AI_API_URL` | `https://api.anthropic.com/v1/messages`  |
    /// | `AI_API_KEY` | unset                                    |
    /// | `AI_MODEL`   | `claude-3-5-haiku-latest`                |
    pub fn from_env() -> Self {
        Self {
            api_url: env_string("AI_API_URL", "https://api.anthropic.com/v1/messages"),
            api_key: env_opt("AI_API_KEY"),
            model: env_string("AI_MODEL", "claude-3-5-haiku-latest"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// From comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Grace period for in-flight requests after a shutdown signal.
    pub shutdown_timeout_secs: u64,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub ai: AiConfig,
}

impl ServerConfig {
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    ///
    /// plus the JWT, storage and AI tables above.
    pub fn from_env() -> Self {
        Self {
            host: env_string("HOST", "0.0.0.0"),
            port: env_or("PORT", 3000),
            cors_origins: parse_origins(&env_string("CORS_ORIGINS", "http://localhost:5173")),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            jwt: JwtConfig::from_env(),
            storage: StorageConfig::from_env(),
            ai: AiConfig::from_env(),
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
