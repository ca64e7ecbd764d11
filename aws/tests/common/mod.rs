//! Helpers shared by the adapter integration tests
#![allow(dead_code)]

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;

use octo_proxy_aws::platform::{ReqwestHttpClient, SystemClock};
use octo_proxy_core::config::{Config, SecretSourceKind};
use octo_proxy_core::error::{ApiError, Result};
use octo_proxy_core::platform::SecretSource;
use octo_proxy_core::proxy::{build_forwarder, Forwarder};
use octo_proxy_core::secrets::{SecretRef, SecretValue};

pub const KEY_SECRET: &str = "github-app-pem";
pub const TOKEN_PATH: &str = "/app/installations/678/access_tokens";
pub const TOKEN_BODY: &str = r#"{"token":"ghs_e2e","expires_at":"2099-01-01T00:00:00Z"}"#;

pub fn private_key_pem() -> &'static str {
    static PEM: OnceLock<String> = OnceLock::new();
    PEM.get_or_init(|| {
        use rand::rngs::OsRng;
        use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};

        rsa::RsaPrivateKey::new(&mut OsRng, 2048)
            .expect("key generation failed")
            .to_pkcs1_pem(LineEnding::LF)
            .expect("PEM export failed")
            .to_string()
    })
}

/// Holds only the App private key
pub struct KeyOnly;

#[async_trait]
impl SecretSource for KeyOnly {
    async fn get_secret(&self, name: &str) -> Result<SecretValue> {
        match name {
            KEY_SECRET => Ok(SecretValue::Text(private_key_pem().to_string())),
            other => Err(ApiError::secret_unavailable(format!("no secret '{}'", other))),
        }
    }

    fn kind(&self) -> &'static str {
        "static"
    }
}

/// Forwarder for App `12345`, installation `678`, accepting only 201 from the exchange
pub fn forwarder(api_base: String, secrets: Arc<dyn SecretSource>) -> Forwarder {
    let config = Config {
        app_id: SecretRef::Literal("12345".to_string()),
        installation_id: SecretRef::Literal("678".to_string()),
        private_key_secret: KEY_SECRET.to_string(),
        secret_source: SecretSourceKind::Env,
        api_base,
        token_success_statuses: vec![201],
        outbound_timeout_secs: 5,
    };
    let http = Arc::new(ReqwestHttpClient::new(Duration::from_secs(5)).expect("client builds"));
    build_forwarder(&config, secrets, http, Arc::new(SystemClock))
}
