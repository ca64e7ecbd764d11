//! Shared startup wiring for the server and Lambda binaries

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use octo_proxy_core::config::{Config, SecretSourceKind};
use octo_proxy_core::platform::{HttpClient, SecretSource};
use octo_proxy_core::proxy::{build_forwarder, Forwarder};
use octo_proxy_core::secrets::{EnvSecretSource, SidecarSecretSource};

use crate::platform::{ProcessEnv, ReqwestHttpClient, SystemClock};
use crate::secrets_manager::SecretsManagerSource;

/// Load configuration from the process environment and wire the forwarder
pub async fn forwarder_from_env() -> anyhow::Result<Forwarder> {
    let config = Config::from_env(&ProcessEnv).context("loading configuration")?;

    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new(Duration::from_secs(
        config.outbound_timeout_secs,
    ))?);

    let secret_source: Arc<dyn SecretSource> = match &config.secret_source {
        SecretSourceKind::SecretsManager => Arc::new(SecretsManagerSource::from_env().await),
        SecretSourceKind::Sidecar {
            port,
            session_token,
        } => Arc::new(SidecarSecretSource::new(http.clone(), *port, session_token.clone())),
        SecretSourceKind::Env => Arc::new(EnvSecretSource::new(Arc::new(ProcessEnv))),
    };
    info!(
        source = secret_source.kind(),
        api = %config.api_base,
        "octo-proxy configured"
    );

    Ok(build_forwarder(&config, secret_source, http, Arc::new(SystemClock)))
}
