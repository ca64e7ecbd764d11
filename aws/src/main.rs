//! octo-proxy: forwards GitHub API calls with the App's installation token attached
//!
//! Configuration errors are fatal at startup; once listening, every request is answered.

use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use octo_proxy_aws::logging;
use octo_proxy_aws::server::{self, AppState};
use octo_proxy_aws::startup::forwarder_from_env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let port: u16 = match std::env::var("PORT") {
        Ok(raw) => raw.parse().context("PORT must be a number")?,
        Err(_) => 8080,
    };

    let state = Arc::new(AppState {
        forwarder: forwarder_from_env().await?,
    });

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;

    info!(port, "octo-proxy listening");
    server::serve(listener, state).await;

    Ok(())
}
