//! Configuration loaded from the environment

use crate::error::{ApiError, Result};
use crate::platform::Environment;
use crate::secrets::{SecretRef, DEFAULT_SIDECAR_PORT};

/// Default GitHub API origin
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// REST API version sent on every upstream call
pub const GITHUB_API_VERSION: &str = "2022-11-28";

pub const USER_AGENT: &str = "octo-proxy";

/// Secrets can be deleted no sooner than 7 days after scheduling, so this is the longest
/// window a fetched secret stays trustworthy.
pub const SECRET_CACHE_WINDOW_SECS: u64 = 7 * 24 * 60 * 60;

/// GitHub rejects App JWTs that expire more than 10 minutes out
pub const APP_JWT_LIFETIME_SECS: u64 = 600;

/// Must stay below [`APP_JWT_LIFETIME_SECS`] so a cached JWT is never expired at use time
pub const APP_JWT_CACHE_WINDOW_SECS: u64 = 540;

const _: () = assert!(APP_JWT_CACHE_WINDOW_SECS < APP_JWT_LIFETIME_SECS);

/// Installation tokens live one hour from issuance
pub const INSTALLATION_TOKEN_CACHE_WINDOW_SECS: u64 = 3600;

/// Statuses accepted from `POST /app/installations/{id}/access_tokens`
///
/// GitHub documents 201; 200 has been observed from compatible servers. Override with
/// `TOKEN_SUCCESS_STATUSES`.
pub const DEFAULT_TOKEN_SUCCESS_STATUSES: &[u16] = &[200, 201];

pub const DEFAULT_OUTBOUND_TIMEOUT_SECS: u64 = 10;

/// Where secrets are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSourceKind {
    /// Direct Secrets Manager API calls
    SecretsManager,
    /// Local parameters-and-secrets extension
    Sidecar { port: u16, session_token: String },
    /// Process environment
    Env,
}

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct Config {
    /// GitHub App ID, literal or secret name
    pub app_id: SecretRef,
    /// Installation ID, literal or secret name
    pub installation_id: SecretRef,
    /// Name of the secret holding the App private key (PEM)
    pub private_key_secret: String,
    pub secret_source: SecretSourceKind,
    /// API origin without trailing slash
    pub api_base: String,
    pub token_success_statuses: Vec<u16>,
    pub outbound_timeout_secs: u64,
}

impl Config {
    /// Load configuration from platform environment
    pub fn from_env(env: &dyn Environment) -> Result<Self> {
        Ok(Self {
            app_id: secret_ref(env, "APP_ID", "APP_ID_SECRET_NAME")?,
            installation_id: secret_ref(env, "INSTALLATION_ID", "INSTALLATION_ID_SECRET_NAME")?,
            private_key_secret: optional(env, "PEM_CONTENTS_SECRET_NAME")
                .map(|name| name.trim().to_string())
                .ok_or_else(|| ApiError::configuration("PEM_CONTENTS_SECRET_NAME not configured"))?,
            secret_source: secret_source(env)?,
            api_base: api_base(optional(env, "GITHUB_API_URL").as_deref())?,
            token_success_statuses: match optional(env, "TOKEN_SUCCESS_STATUSES") {
                Some(raw) => parse_statuses(&raw)?,
                None => DEFAULT_TOKEN_SUCCESS_STATUSES.to_vec(),
            },
            outbound_timeout_secs: match optional(env, "OUTBOUND_TIMEOUT_SECS") {
                Some(raw) => raw.parse().map_err(|_| {
                    ApiError::configuration(format!("OUTBOUND_TIMEOUT_SECS must be a number, got '{}'", raw))
                })?,
                None => DEFAULT_OUTBOUND_TIMEOUT_SECS,
            },
        })
    }
}

fn optional(env: &dyn Environment, name: &str) -> Option<String> {
    env.get_var(name).ok().filter(|v| !v.trim().is_empty())
}

fn secret_ref(env: &dyn Environment, literal_var: &str, secret_var: &str) -> Result<SecretRef> {
    if let Some(value) = optional(env, literal_var) {
        return Ok(SecretRef::Literal(value.trim().to_string()));
    }
    optional(env, secret_var)
        .map(SecretRef::Secret)
        .ok_or_else(|| {
            ApiError::configuration(format!("either {} or {} must be set", literal_var, secret_var))
        })
}

fn secret_source(env: &dyn Environment) -> Result<SecretSourceKind> {
    match optional(env, "SECRET_SOURCE").as_deref() {
        None | Some("secrets-manager") => Ok(SecretSourceKind::SecretsManager),
        Some("env") => Ok(SecretSourceKind::Env),
        Some("sidecar") => {
            let port = match optional(env, "PARAMETERS_SECRETS_EXTENSION_HTTP_PORT") {
                Some(raw) => raw.parse().map_err(|_| {
                    ApiError::configuration(format!(
                        "PARAMETERS_SECRETS_EXTENSION_HTTP_PORT must be a port number, got '{}'",
                        raw
                    ))
                })?,
                None => DEFAULT_SIDECAR_PORT,
            };
            let session_token = optional(env, "AWS_SESSION_TOKEN").ok_or_else(|| {
                ApiError::configuration("AWS_SESSION_TOKEN is required for the sidecar secret source")
            })?;
            Ok(SecretSourceKind::Sidecar { port, session_token })
        }
        Some(other) => Err(ApiError::configuration(format!(
            "unknown SECRET_SOURCE '{}' (expected secrets-manager, sidecar or env)",
            other
        ))),
    }
}

fn api_base(raw: Option<&str>) -> Result<String> {
    let raw = raw.unwrap_or(GITHUB_API_BASE).trim();
    let parsed = url::Url::parse(raw)
        .map_err(|e| ApiError::configuration(format!("GITHUB_API_URL is not a valid URL: {}", e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiError::configuration("GITHUB_API_URL must be http or https"));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

/// Parse a comma-separated list of HTTP status codes
pub fn parse_statuses(raw: &str) -> Result<Vec<u16>> {
    let statuses = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u16>()
                .ok()
                .filter(|code| (100..600).contains(code))
                .ok_or_else(|| ApiError::configuration(format!("invalid status code '{}'", s)))
        })
        .collect::<Result<Vec<_>>>()?;

    if statuses.is_empty() {
        return Err(ApiError::configuration("TOKEN_SUCCESS_STATUSES must not be empty"));
    }
    Ok(statuses)
}
