//! Header passthrough policy
//!
//! Both directions use an allow-list. Inbound caller headers are reduced to the ones that
//! steer content negotiation and conditional requests; upstream response headers are
//! reduced to metadata a GitHub client relies on. Hop-by-hop, `Content-Length` and
//! `Content-Encoding` headers never cross the proxy since the body may be re-framed.

use crate::config::{GITHUB_API_VERSION, USER_AGENT};

/// Caller headers forwarded upstream
pub const REQUEST_HEADER_ALLOWLIST: &[&str] = &[
    "accept",
    "content-type",
    "if-none-match",
    "if-modified-since",
];

/// Upstream headers relayed to the caller
pub const RESPONSE_HEADER_ALLOWLIST: &[&str] = &[
    "content-type",
    "etag",
    "last-modified",
    "link",
    "location",
    "retry-after",
    "x-github-request-id",
    "x-github-media-type",
    "x-oauth-scopes",
    "x-accepted-oauth-scopes",
];

const RESPONSE_HEADER_PREFIXES: &[&str] = &["x-ratelimit-"];

const DEFAULT_ACCEPT: &str = "application/vnd.github+json";
const DEFAULT_CONTENT_TYPE: &str = "application/json";

fn allowed_request_header(name: &str) -> bool {
    REQUEST_HEADER_ALLOWLIST
        .iter()
        .any(|h| h.eq_ignore_ascii_case(name))
}

fn allowed_response_header(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    RESPONSE_HEADER_ALLOWLIST.contains(&lower.as_str())
        || RESPONSE_HEADER_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Headers for the upstream call: credentials first, then the allowed caller headers
pub fn upstream_request_headers(
    inbound: &[(String, String)],
    token: &str,
    has_body: bool,
) -> Vec<(String, String)> {
    let mut headers = vec![
        ("Authorization".to_string(), format!("Bearer {}", token)),
        ("X-GitHub-Api-Version".to_string(), GITHUB_API_VERSION.to_string()),
        ("User-Agent".to_string(), USER_AGENT.to_string()),
    ];

    headers.extend(
        inbound
            .iter()
            .filter(|(name, _)| allowed_request_header(name))
            .map(|(name, value)| (name.to_ascii_lowercase(), value.clone())),
    );

    let has = |headers: &[(String, String)], name: &str| {
        headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    };
    if !has(&headers, "accept") {
        headers.push(("accept".to_string(), DEFAULT_ACCEPT.to_string()));
    }
    if has_body && !has(&headers, "content-type") {
        headers.push(("content-type".to_string(), DEFAULT_CONTENT_TYPE.to_string()));
    }

    headers
}

/// Headers relayed back to the caller
pub fn relayed_response_headers(upstream: &[(String, String)]) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = upstream
        .iter()
        .filter(|(name, _)| allowed_response_header(name))
        .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
        .collect();
    headers.push(("access-control-allow-origin".to_string(), "*".to_string()));
    headers
}
