//! Platform abstraction traits
//!
//! These traits define the boundary between the platform-agnostic core and the
//! deployment adapters (HTTP server, secret store clients, wall clock).

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::secrets::SecretValue;

/// Outbound HTTP request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Case-insensitive header lookup
    pub fn header_value(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// HTTP response from an outbound request
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Parse body as UTF-8 string
    pub fn text(&self) -> std::result::Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.clone())
    }

    /// Parse body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> std::result::Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup
    pub fn header_value(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// HTTP client for outbound requests (GitHub API, secrets sidecar)
///
/// Implementations apply their own transport timeout and report it as
/// [`ApiError::UpstreamTimeout`](crate::error::ApiError::UpstreamTimeout).
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;

    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        self.send(with_headers(HttpRequest::new("GET", url), headers))
            .await
    }
}

fn with_headers(request: HttpRequest, headers: &[(&str, &str)]) -> HttpRequest {
    headers
        .iter()
        .fold(request, |req, (name, value)| req.header(*name, *value))
}

/// Clock for current time (enables testing with deterministic timestamps)
pub trait Clock: Send + Sync {
    fn now_secs(&self) -> u64;
}

/// Environment variable access
pub trait Environment: Send + Sync {
    fn get_var(&self, name: &str) -> Result<String>;
}

/// A store that resolves named secrets
///
/// Implementations perform one store round-trip per call; caching is layered on top by
/// [`SecretAccessor`](crate::secrets::SecretAccessor).
#[async_trait]
pub trait SecretSource: Send + Sync {
    async fn get_secret(&self, name: &str) -> Result<SecretValue>;

    /// Short label used in logs
    fn kind(&self) -> &'static str;
}
