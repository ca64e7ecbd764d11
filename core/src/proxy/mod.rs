//! Request forwarding
//!
//! Attaches the current installation token to caller requests and relays GitHub's answer.

pub mod event;
mod forward;
pub mod headers;

use std::sync::Arc;

use crate::config::Config;
use crate::github::{AppJwtMinter, InstallationTokenBroker};
use crate::platform::{Clock, HttpClient, SecretSource};
use crate::secrets::SecretAccessor;

pub use forward::{Forwarder, FORWARD_FAILURE_MESSAGE, TOKEN_FAILURE_MESSAGE};

/// Inbound proxy request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyRequest {
    pub method: String,
    /// API path relative to the GitHub origin, e.g. `repos/acme/widgets/issues`
    pub path: String,
    /// Raw query string without the leading `?`
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl ProxyRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }
}

/// Response handed back to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ProxyResponse {
    /// Plain-text response generated by the proxy itself
    pub fn text(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            headers: vec![(
                "content-type".to_string(),
                "text/plain; charset=utf-8".to_string(),
            )],
            body: message.into().into_bytes(),
        }
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Wire the secret accessor, JWT minter, token broker and forwarder from configuration
pub fn build_forwarder(
    config: &Config,
    secret_source: Arc<dyn SecretSource>,
    http: Arc<dyn HttpClient>,
    clock: Arc<dyn Clock>,
) -> Forwarder {
    let secrets = Arc::new(SecretAccessor::new(secret_source, clock.clone()));
    let minter = Arc::new(AppJwtMinter::new(
        config.app_id.clone(),
        config.private_key_secret.clone(),
        secrets.clone(),
        clock.clone(),
    ));
    let broker = Arc::new(InstallationTokenBroker::new(
        config.installation_id.clone(),
        config.api_base.clone(),
        config.token_success_statuses.clone(),
        minter,
        secrets,
        http.clone(),
        clock,
    ));
    Forwarder::new(broker, http, config.api_base.clone())
}
