//! Secrets fetched through the local parameters-and-secrets extension
//!
//! The extension listens on localhost and proxies Secrets Manager `GetSecretValue`,
//! authenticated with the function's session token.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;
use tracing::warn;

use super::SecretValue;
use crate::error::{ApiError, Result};
use crate::platform::{HttpClient, SecretSource};

/// Port the extension listens on unless configured otherwise
pub const DEFAULT_SIDECAR_PORT: u16 = 2773;

const TOKEN_HEADER: &str = "X-Aws-Parameters-Secrets-Token";

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetSecretValueResponse {
    secret_string: Option<String>,
    secret_binary: Option<String>,
}

/// [`SecretSource`] backed by the local secrets extension
pub struct SidecarSecretSource {
    http: Arc<dyn HttpClient>,
    port: u16,
    session_token: String,
}

impl SidecarSecretSource {
    pub fn new(http: Arc<dyn HttpClient>, port: u16, session_token: impl Into<String>) -> Self {
        Self {
            http,
            port,
            session_token: session_token.into(),
        }
    }

    fn secret_url(&self, name: &str) -> Result<String> {
        let base = format!("http://localhost:{}/secretsmanager/get", self.port);
        url::Url::parse_with_params(&base, &[("secretId", name)])
            .map(String::from)
            .map_err(|e| ApiError::internal(format!("invalid sidecar url: {}", e)))
    }
}

#[async_trait]
impl SecretSource for SidecarSecretSource {
    async fn get_secret(&self, name: &str) -> Result<SecretValue> {
        let url = self.secret_url(name)?;
        let headers = [(TOKEN_HEADER, self.session_token.as_str())];

        let response = self.http.get(&url, &headers).await.map_err(|e| {
            ApiError::secret_unavailable(format!("secrets extension call failed: {}", e))
        })?;

        if !response.is_success() {
            warn!(secret = name, status = response.status, "secrets extension rejected request");
            return Err(ApiError::secret_unavailable(format!(
                "secrets extension returned {} for '{}'",
                response.status, name
            )));
        }

        let parsed: GetSecretValueResponse = response.json().map_err(|e| {
            ApiError::secret_unavailable(format!("failed to parse secrets extension response: {}", e))
        })?;

        match (parsed.secret_string, parsed.secret_binary) {
            (Some(text), _) => Ok(SecretValue::Text(text)),
            (None, Some(encoded)) => BASE64
                .decode(encoded.as_bytes())
                .map(SecretValue::Binary)
                .map_err(|e| ApiError::secret_unavailable(format!("invalid SecretBinary encoding: {}", e))),
            (None, None) => Err(ApiError::secret_unavailable(format!(
                "secret '{}' has no value",
                name
            ))),
        }
    }

    fn kind(&self) -> &'static str {
        "sidecar"
    }
}
