//! Forwarder: token resolution, upstream call, response relay
//!
//! A request either reaches GitHub with a valid installation token or is answered by the
//! proxy itself: 401 when GitHub refused the token exchange, 500 for anything else. Internal
//! error text is logged, never returned.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::headers::{relayed_response_headers, upstream_request_headers};
use super::{ProxyRequest, ProxyResponse};
use crate::error::ApiError;
use crate::github::InstallationTokenBroker;
use crate::platform::{HttpClient, HttpRequest};

/// Body of the 500 returned when no installation token could be produced
pub const TOKEN_FAILURE_MESSAGE: &str =
    "Unexpected server error when generating authorization tokens";

/// Body of the 500 returned when the passthrough call itself failed
pub const FORWARD_FAILURE_MESSAGE: &str =
    "Unexpected server error when forwarding request to GitHub";

pub struct Forwarder {
    broker: Arc<InstallationTokenBroker>,
    http: Arc<dyn HttpClient>,
    api_base: String,
}

impl Forwarder {
    pub fn new(
        broker: Arc<InstallationTokenBroker>,
        http: Arc<dyn HttpClient>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            broker,
            http,
            api_base: api_base.into(),
        }
    }

    /// Upstream URL: API origin, caller path verbatim, caller query verbatim
    pub fn upstream_url(&self, request: &ProxyRequest) -> String {
        let mut url = format!("{}/{}", self.api_base, request.path.trim_start_matches('/'));
        if let Some(query) = request.query.as_deref().filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    /// Forward a caller request; never fails, errors become 401/500 responses
    pub async fn forward(&self, request: ProxyRequest) -> ProxyResponse {
        let token = match self.broker.current().await {
            Ok(token) => token,
            Err(err @ ApiError::Authorization { .. }) => {
                warn!(method = %request.method, path = %request.path, "authorization failed");
                return ProxyResponse::text(401, err.to_string());
            }
            Err(err) => {
                error!(
                    method = %request.method,
                    path = %request.path,
                    error = %err,
                    "failed to resolve installation token"
                );
                return ProxyResponse::text(500, TOKEN_FAILURE_MESSAGE);
            }
        };

        let has_body = request.body.is_some();
        let upstream = HttpRequest {
            method: request.method.clone(),
            url: self.upstream_url(&request),
            headers: upstream_request_headers(&request.headers, &token.token, has_body),
            body: request.body,
        };

        match self.http.send(upstream).await {
            Ok(response) => {
                info!(
                    method = %request.method,
                    path = %request.path,
                    status = response.status,
                    "forwarded request"
                );
                ProxyResponse {
                    status: response.status,
                    headers: relayed_response_headers(&response.headers),
                    body: response.body,
                }
            }
            Err(err) => {
                error!(
                    method = %request.method,
                    path = %request.path,
                    error = %err,
                    "upstream call failed"
                );
                ProxyResponse::text(500, FORWARD_FAILURE_MESSAGE)
            }
        }
    }
}
