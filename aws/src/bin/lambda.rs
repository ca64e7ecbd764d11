//! octo-proxy-lambda: the forwarder behind an API-gateway `{proxy+}` Lambda integration

use octo_proxy_aws::{lambda, logging};
use octo_proxy_aws::startup::forwarder_from_env;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    logging::init();

    let forwarder = forwarder_from_env().await?;
    lambda::run(forwarder).await
}
