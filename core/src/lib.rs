//! octo-proxy-core: Platform-agnostic core of the GitHub App credential proxy
//!
//! Holds the layered credential cache (secret material, App JWT, installation token) and
//! the request forwarder gated behind it. It depends only on abstract platform traits
//! (HttpClient, Clock, Environment, SecretSource) and never imports adapter code.

pub mod cache;
pub mod config;
pub mod error;
pub mod github;
pub mod platform;
pub mod proxy;
pub mod secrets;

#[cfg(test)]
pub mod test_support;
