//! Lambda runtime entry point
//!
//! Each invocation payload is a gateway proxy event; the reply is always a gateway response,
//! so the runtime never sees a handler error.

use std::sync::Arc;

use lambda_runtime::{service_fn, LambdaEvent};
use serde_json::Value;
use tracing::debug;

use octo_proxy_core::proxy::event::{handle_event, GatewayResponse};
use octo_proxy_core::proxy::Forwarder;

/// Answer one invocation
pub async fn handle(forwarder: &Forwarder, request_id: &str, payload: Value) -> GatewayResponse {
    debug!(request_id, "gateway event received");
    handle_event(forwarder, payload).await
}

/// Poll the runtime API until the sandbox shuts down
pub async fn run(forwarder: Forwarder) -> Result<(), lambda_runtime::Error> {
    let forwarder = Arc::new(forwarder);
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let forwarder = forwarder.clone();
        async move {
            let LambdaEvent { payload, context } = event;
            Ok::<_, lambda_runtime::Error>(handle(&forwarder, &context.request_id, payload).await)
        }
    }))
    .await
}
