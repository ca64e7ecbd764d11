//! Secrets read from the process environment (local development)

use std::sync::Arc;

use async_trait::async_trait;

use super::SecretValue;
use crate::error::{ApiError, Result};
use crate::platform::{Environment, SecretSource};

/// [`SecretSource`] that reads secrets from environment variables
///
/// The secret name is tried verbatim first, then upper-cased with every character outside
/// `[A-Z0-9_]` replaced by `_` (so `github/app-key` also matches `GITHUB_APP_KEY`).
pub struct EnvSecretSource {
    env: Arc<dyn Environment>,
}

impl EnvSecretSource {
    pub fn new(env: Arc<dyn Environment>) -> Self {
        Self { env }
    }
}

fn env_var_name(secret_name: &str) -> String {
    secret_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl SecretSource for EnvSecretSource {
    async fn get_secret(&self, name: &str) -> Result<SecretValue> {
        self.env
            .get_var(name)
            .or_else(|_| self.env.get_var(&env_var_name(name)))
            .map(SecretValue::Text)
            .map_err(|_| ApiError::secret_unavailable(format!("secret '{}' not found in environment", name)))
    }

    fn kind(&self) -> &'static str {
        "env"
    }
}
