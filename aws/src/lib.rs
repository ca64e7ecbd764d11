//! octo-proxy-aws: server and Lambda adapters for the GitHub App credential proxy
//!
//! Serves the core forwarder over hyper or the Lambda runtime and supplies native platform
//! implementations, including the Secrets Manager secret source.

pub mod lambda;
pub mod logging;
pub mod platform;
pub mod secrets_manager;
pub mod server;
pub mod startup;
