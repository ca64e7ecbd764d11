//! GitHub App JWT minting
//!
//! App JWTs are RS256-signed with the App private key and live for ten minutes. The minter
//! caches one per 9-minute window so a handed-out JWT always has time left on it.

use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::TimeWindowedCache;
use crate::config::{APP_JWT_CACHE_WINDOW_SECS, APP_JWT_LIFETIME_SECS};
use crate::error::{ApiError, Result};
use crate::platform::Clock;
use crate::secrets::{SecretAccessor, SecretRef};

/// GitHub App JWT claims
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct AppJwtClaims {
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// Signed App-level assertion
#[derive(Clone, PartialEq, Eq)]
pub struct AppJwt {
    pub token: String,
    pub issued_at: u64,
    pub expires_at: u64,
}

impl fmt::Debug for AppJwt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppJwt")
            .field("token", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Sign an App JWT for `app_id` issued at `now_secs`
pub fn mint(app_id: &str, pem: &[u8], now_secs: u64) -> Result<AppJwt> {
    let expires_at = now_secs + APP_JWT_LIFETIME_SECS;
    let claims = AppJwtClaims {
        iat: to_timestamp(now_secs)?,
        exp: to_timestamp(expires_at)?,
        iss: app_id.to_string(),
    };

    let key = EncodingKey::from_rsa_pem(pem)
        .map_err(|e| ApiError::signing(format!("invalid private key: {}", e)))?;

    let token = encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| ApiError::signing(format!("failed to encode JWT: {}", e)))?;

    Ok(AppJwt {
        token,
        issued_at: now_secs,
        expires_at,
    })
}

fn to_timestamp(secs: u64) -> Result<i64> {
    i64::try_from(secs).map_err(|_| ApiError::signing("timestamp out of range"))
}

/// Mints App JWTs on demand, caching one per window
pub struct AppJwtMinter {
    app_id: SecretRef,
    private_key_secret: String,
    secrets: Arc<SecretAccessor>,
    clock: Arc<dyn Clock>,
    cache: TimeWindowedCache<(SecretRef, String), AppJwt>,
}

impl AppJwtMinter {
    pub fn new(
        app_id: SecretRef,
        private_key_secret: impl Into<String>,
        secrets: Arc<SecretAccessor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            app_id,
            private_key_secret: private_key_secret.into(),
            secrets,
            clock,
            cache: TimeWindowedCache::new(APP_JWT_CACHE_WINDOW_SECS),
        }
    }

    /// Return the JWT for the current window, signing a new one on a miss
    pub async fn current(&self) -> Result<AppJwt> {
        let now = self.clock.now_secs();
        let key = (self.app_id.clone(), self.private_key_secret.clone());

        self.cache
            .get_or_try_insert_with(key, now, async {
                debug!(key_secret = %self.private_key_secret, "app JWT cache miss");
                let app_id = self.secrets.resolve(&self.app_id).await?;
                let pem = self.secrets.fetch(&self.private_key_secret).await?;
                mint(&app_id, pem.as_bytes(), now)
            })
            .await
    }
}
