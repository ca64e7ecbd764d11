//! Secret resolution
//!
//! [`SecretAccessor`] puts a time-windowed cache in front of a [`SecretSource`] so that a
//! warm instance reaches the secret store at most once per window per secret name.

mod env;
mod sidecar;

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::cache::TimeWindowedCache;
use crate::config::SECRET_CACHE_WINDOW_SECS;
use crate::error::{ApiError, Result};
use crate::platform::{Clock, SecretSource};

pub use env::EnvSecretSource;
pub use sidecar::{SidecarSecretSource, DEFAULT_SIDECAR_PORT};

/// Secret payload as returned by the store
///
/// String and binary secrets are interchangeable at this interface; callers decode with
/// [`SecretValue::as_bytes`] or [`SecretValue::into_string`].
#[derive(Clone, PartialEq, Eq)]
pub enum SecretValue {
    Text(String),
    Binary(Vec<u8>),
}

impl SecretValue {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(s) => s.as_bytes(),
            Self::Binary(b) => b,
        }
    }

    /// Decode as UTF-8 text with surrounding whitespace removed
    pub fn into_string(self) -> Result<String> {
        let text = match self {
            Self::Text(s) => s,
            Self::Binary(b) => String::from_utf8(b)
                .map_err(|_| ApiError::secret_unavailable("secret payload is not valid UTF-8"))?,
        };
        Ok(text.trim().to_string())
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "SecretValue::Text(<{} bytes>)", s.len()),
            Self::Binary(b) => write!(f, "SecretValue::Binary(<{} bytes>)", b.len()),
        }
    }
}

/// A configured value given either literally or by the name of a secret holding it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SecretRef {
    Literal(String),
    Secret(String),
}

/// Cached secret lookups
pub struct SecretAccessor {
    source: Arc<dyn SecretSource>,
    clock: Arc<dyn Clock>,
    cache: TimeWindowedCache<String, SecretValue>,
}

impl SecretAccessor {
    pub fn new(source: Arc<dyn SecretSource>, clock: Arc<dyn Clock>) -> Self {
        Self::with_window(source, clock, SECRET_CACHE_WINDOW_SECS)
    }

    pub fn with_window(
        source: Arc<dyn SecretSource>,
        clock: Arc<dyn Clock>,
        window_secs: u64,
    ) -> Self {
        Self {
            source,
            clock,
            cache: TimeWindowedCache::new(window_secs),
        }
    }

    /// Fetch a secret, hitting the store only on a cache miss
    pub async fn fetch(&self, name: &str) -> Result<SecretValue> {
        let now = self.clock.now_secs();
        self.cache
            .get_or_try_insert_with(name.to_string(), now, async {
                debug!(secret = name, source = self.source.kind(), "secret cache miss");
                self.source.get_secret(name).await
            })
            .await
    }

    /// Resolve a literal-or-secret reference to its text value
    pub async fn resolve(&self, reference: &SecretRef) -> Result<String> {
        match reference {
            SecretRef::Literal(value) => Ok(value.clone()),
            SecretRef::Secret(name) => self.fetch(name).await?.into_string(),
        }
    }
}
