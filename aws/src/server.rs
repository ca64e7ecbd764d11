//! HTTP/1 front end
//!
//! `GET /healthz` answers locally; every other method and path is handed to the forwarder.
//! Each connection runs on its own task, so slow upstream calls do not block other callers.

use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::fmt::Display;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, warn};

use octo_proxy_core::error::{ApiError, ErrorResponse};
use octo_proxy_core::proxy::{Forwarder, ProxyRequest, ProxyResponse};

/// Shared application state
pub struct AppState {
    pub forwarder: Forwarder,
}

pub type HyperResponse = Response<Full<Bytes>>;

/// Accept connections until the listener fails
pub async fn serve(listener: TcpListener, state: Arc<AppState>) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "accept failed");
                continue;
            }
        };
        let state = state.clone();

        tokio::spawn(async move {
            let io = hyper_util::rt::TokioIo::new(stream);
            let service = service_fn(move |req| {
                let state = state.clone();
                async move { Ok::<_, Infallible>(route_request(req, &state).await) }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                debug!(%peer, error = %e, "connection error");
            }
        });
    }
}

pub async fn route_request<B>(req: Request<B>, state: &AppState) -> HyperResponse
where
    B: Body,
    B::Error: Display,
{
    if *req.method() == Method::GET && req.uri().path() == "/healthz" {
        return handle_health();
    }
    handle_proxy(req, state).await
}

fn handle_health() -> HyperResponse {
    json_response(
        StatusCode::OK,
        &serde_json::json!({
            "name": "octo-proxy",
            "platform": "aws",
        }),
    )
}

async fn handle_proxy<B>(req: Request<B>, state: &AppState) -> HyperResponse
where
    B: Body,
    B::Error: Display,
{
    let (parts, body) = req.into_parts();

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(error = %e, "failed to read request body");
            return error_response(&ApiError::invalid_request("failed to read body"));
        }
    };

    let headers = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    let request = ProxyRequest {
        method: parts.method.as_str().to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        headers,
        body: (!body.is_empty()).then(|| body.to_vec()),
    };

    proxy_response(state.forwarder.forward(request).await)
}

fn proxy_response(response: ProxyResponse) -> HyperResponse {
    let mut out = Response::new(Full::new(Bytes::from(response.body)));
    *out.status_mut() =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let headers = out.headers_mut();
    for (name, value) in response.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => debug!(header = %name, "dropping unrepresentable header"),
        }
    }
    out
}

fn error_response(err: &ApiError) -> HyperResponse {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    json_response(status, &ErrorResponse::from(err))
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: &T) -> HyperResponse {
    let json = serde_json::to_vec(body).unwrap_or_default();
    let mut response = Response::new(Full::new(Bytes::from(json)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
