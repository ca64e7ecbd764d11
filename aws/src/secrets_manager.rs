//! AWS Secrets Manager secret source
//!
//! Calls `GetSecretValue` directly with the ambient AWS credentials.

use async_trait::async_trait;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::Client;

use octo_proxy_core::error::{ApiError, Result};
use octo_proxy_core::platform::SecretSource;
use octo_proxy_core::secrets::SecretValue;

/// [`SecretSource`] backed by the Secrets Manager API
pub struct SecretsManagerSource {
    client: Client,
}

impl SecretsManagerSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the default credential and region chain
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl SecretSource for SecretsManagerSource {
    async fn get_secret(&self, name: &str) -> Result<SecretValue> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(|e| {
                ApiError::secret_unavailable(format!(
                    "GetSecretValue failed for '{}': {}",
                    name,
                    DisplayErrorContext(&e)
                ))
            })?;

        if let Some(text) = output.secret_string() {
            return Ok(SecretValue::Text(text.to_string()));
        }
        if let Some(blob) = output.secret_binary() {
            return Ok(SecretValue::Binary(blob.as_ref().to_vec()));
        }
        Err(ApiError::secret_unavailable(format!(
            "secret '{}' has no value",
            name
        )))
    }

    fn kind(&self) -> &'static str {
        "secrets-manager"
    }
}
