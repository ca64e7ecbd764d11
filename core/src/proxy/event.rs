//! API-gateway proxy integration event shape
//!
//! Lets the forwarder sit behind a gateway `{proxy+}` route that hands over a JSON event
//! and expects `{statusCode, body, headers}` back.

use std::collections::{BTreeMap, HashMap};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Forwarder, ProxyRequest, ProxyResponse};
use crate::error::{ApiError, Result};

#[derive(Deserialize, Debug, Default)]
pub struct PathParameters {
    pub proxy: Option<String>,
}

/// Inbound gateway event
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEvent {
    pub http_method: String,
    #[serde(default)]
    pub path_parameters: Option<PathParameters>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub query_string_parameters: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl GatewayEvent {
    pub fn into_proxy_request(self) -> Result<ProxyRequest> {
        let path = self
            .path_parameters
            .and_then(|p| p.proxy)
            .unwrap_or_default();

        let query = self
            .query_string_parameters
            .filter(|params| !params.is_empty())
            .map(|params| {
                url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(params.iter())
                    .finish()
            });

        let body = match self.body.filter(|b| !b.is_empty()) {
            Some(encoded) if self.is_base64_encoded => Some(
                BASE64
                    .decode(encoded.as_bytes())
                    .map_err(|_| ApiError::invalid_request("body is not valid base64"))?,
            ),
            Some(text) => Some(text.into_bytes()),
            None => None,
        };

        Ok(ProxyRequest {
            method: self.http_method.to_ascii_uppercase(),
            path,
            query,
            headers: self.headers.unwrap_or_default().into_iter().collect(),
            body,
        })
    }
}

/// Outbound gateway response
#[derive(Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub body: String,
    pub headers: BTreeMap<String, String>,
    pub is_base64_encoded: bool,
}

impl From<ProxyResponse> for GatewayResponse {
    fn from(response: ProxyResponse) -> Self {
        let headers = response.headers.into_iter().collect();
        match String::from_utf8(response.body) {
            Ok(body) => Self {
                status_code: response.status,
                body,
                headers,
                is_base64_encoded: false,
            },
            Err(e) => Self {
                status_code: response.status,
                body: BASE64.encode(e.into_bytes()),
                headers,
                is_base64_encoded: true,
            },
        }
    }
}

/// Handle one raw gateway event; never fails
pub async fn handle_event(forwarder: &Forwarder, event: serde_json::Value) -> GatewayResponse {
    let request = serde_json::from_value::<GatewayEvent>(event)
        .map_err(|e| ApiError::invalid_request(format!("malformed event: {}", e)))
        .and_then(GatewayEvent::into_proxy_request);

    match request {
        Ok(request) => forwarder.forward(request).await.into(),
        Err(err) => {
            warn!(error = %err, "rejected gateway event");
            ProxyResponse::text(err.status_code(), err.to_string()).into()
        }
    }
}
