//! Installation access tokens
//!
//! Exchanges the App JWT for an installation token and caches it per hour window.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::jwt::{AppJwt, AppJwtMinter};
use crate::cache::TimeWindowedCache;
use crate::config::{GITHUB_API_VERSION, INSTALLATION_TOKEN_CACHE_WINDOW_SECS, USER_AGENT};
use crate::error::{ApiError, Result};
use crate::platform::{Clock, HttpClient, HttpRequest};
use crate::secrets::{SecretAccessor, SecretRef};

/// Message carried by the authorization failure; safe to show to proxy callers
pub const INSTALLATION_TOKEN_ERROR: &str = "Failed retrieving installation token";

/// Installation token response from GitHub
#[derive(Deserialize)]
struct InstallationTokenResponse {
    token: String,
    expires_at: Option<String>,
}

/// Bearer credential scoped to one installation
#[derive(Clone, PartialEq, Eq)]
pub struct InstallationToken {
    pub token: String,
    /// RFC 3339 expiry reported by GitHub
    pub expires_at: Option<String>,
}

impl InstallationToken {
    /// Seconds left before expiry, if GitHub reported one and it lies in the future
    pub fn expires_in(&self, now_secs: u64) -> Option<u64> {
        let expires_at = self.expires_at.as_deref()?;
        calculate_expires_in_from_now(expires_at, i64::try_from(now_secs).ok()?)
    }
}

impl fmt::Debug for InstallationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallationToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

fn calculate_expires_in_from_now(expires_at: &str, now_secs: i64) -> Option<u64> {
    use chrono::{DateTime, Utc};

    let expires_dt: DateTime<Utc> = expires_at.parse().ok()?;
    let diff = expires_dt.timestamp() - now_secs;

    u64::try_from(diff).ok().filter(|d| *d > 0)
}

/// Create an installation access token
///
/// Any status outside `success_statuses` is an authorization failure; the upstream status
/// and body are logged and never returned.
pub async fn create_installation_token(
    api_base: &str,
    installation_id: u64,
    app_jwt: &AppJwt,
    success_statuses: &[u16],
    http: &dyn HttpClient,
) -> Result<InstallationToken> {
    let url = format!("{}/app/installations/{}/access_tokens", api_base, installation_id);

    let request = HttpRequest::new("POST", url)
        .header("Authorization", format!("Bearer {}", app_jwt.token))
        .header("Accept", "application/vnd.github+json")
        .header("User-Agent", USER_AGENT)
        .header("X-GitHub-Api-Version", GITHUB_API_VERSION);

    let response = http.send(request).await?;

    if !success_statuses.contains(&response.status) {
        let error_body = response.text().unwrap_or_else(|_| "unknown error".to_string());
        warn!(
            installation_id,
            status = response.status,
            body = %error_body,
            "GitHub rejected installation token request"
        );
        return Err(ApiError::authorization(INSTALLATION_TOKEN_ERROR));
    }

    let token_response: InstallationTokenResponse = response
        .json()
        .map_err(|e| ApiError::upstream_error(format!("failed to parse response: {}", e)))?;

    Ok(InstallationToken {
        token: token_response.token,
        expires_at: token_response.expires_at,
    })
}

/// Hands out the installation token for the current hour window
pub struct InstallationTokenBroker {
    installation_id: SecretRef,
    api_base: String,
    success_statuses: Vec<u16>,
    minter: Arc<AppJwtMinter>,
    secrets: Arc<SecretAccessor>,
    http: Arc<dyn HttpClient>,
    clock: Arc<dyn Clock>,
    cache: TimeWindowedCache<SecretRef, InstallationToken>,
}

impl InstallationTokenBroker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        installation_id: SecretRef,
        api_base: impl Into<String>,
        success_statuses: Vec<u16>,
        minter: Arc<AppJwtMinter>,
        secrets: Arc<SecretAccessor>,
        http: Arc<dyn HttpClient>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            installation_id,
            api_base: api_base.into(),
            success_statuses,
            minter,
            secrets,
            http,
            clock,
            cache: TimeWindowedCache::new(INSTALLATION_TOKEN_CACHE_WINDOW_SECS),
        }
    }

    /// Return the token for the current window, exchanging a fresh App JWT on a miss
    pub async fn current(&self) -> Result<InstallationToken> {
        let now = self.clock.now_secs();

        self.cache
            .get_or_try_insert_with(self.installation_id.clone(), now, async {
                debug!("installation token cache miss");
                let installation_id = self.resolve_installation_id().await?;
                let app_jwt = self.minter.current().await?;
                let token = create_installation_token(
                    &self.api_base,
                    installation_id,
                    &app_jwt,
                    &self.success_statuses,
                    self.http.as_ref(),
                )
                .await?;
                info!(
                    installation_id,
                    expires_in = token.expires_in(now),
                    "issued installation token"
                );
                Ok(token)
            })
            .await
    }

    async fn resolve_installation_id(&self) -> Result<u64> {
        let raw = self.secrets.resolve(&self.installation_id).await?;
        raw.parse()
            .map_err(|_| ApiError::configuration("installation ID must be a positive integer"))
    }
}
