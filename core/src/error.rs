//! Error types and HTTP status mapping

use serde::Serialize;
use thiserror::Error;

/// Result type alias for proxy operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Proxy error with HTTP status code mapping
///
/// Only [`ApiError::Authorization`] is ever shown to a proxy caller verbatim. Every other
/// variant is logged and replaced by a fixed message at the forwarder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("secret unavailable: {message}")]
    SecretUnavailable { message: String },

    #[error("signing error: {message}")]
    Signing { message: String },

    #[error("{message}")]
    Authorization { message: String },

    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },

    #[error("upstream error: {message}")]
    UpstreamError { message: String },

    #[error("upstream timeout")]
    UpstreamTimeout,
}

impl ApiError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn secret_unavailable(message: impl Into<String>) -> Self {
        Self::SecretUnavailable {
            message: message.into(),
        }
    }

    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing {
            message: message.into(),
        }
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn upstream_error(message: impl Into<String>) -> Self {
        Self::UpstreamError {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Authorization { .. } => 401,
            Self::InvalidRequest { .. } => 400,
            Self::Configuration { .. }
            | Self::SecretUnavailable { .. }
            | Self::Signing { .. }
            | Self::Internal { .. }
            | Self::UpstreamError { .. }
            | Self::UpstreamTimeout => 500,
        }
    }

    /// Get the error key for this error
    pub fn error_key(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration_error",
            Self::SecretUnavailable { .. } => "secret_unavailable",
            Self::Signing { .. } => "signing_error",
            Self::Authorization { .. } => "authorization_failed",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::Internal { .. } => "internal_error",
            Self::UpstreamError { .. } => "upstream_error",
            Self::UpstreamTimeout => "upstream_timeout",
        }
    }

    /// Whether the error text is safe to hand back to a caller
    pub fn is_caller_visible(&self) -> bool {
        matches!(self, Self::Authorization { .. } | Self::InvalidRequest { .. })
    }
}

/// Error response body
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        let message = if err.is_caller_visible() {
            err.to_string()
        } else {
            "internal server error".to_string()
        };
        Self {
            error: err.error_key().to_string(),
            message,
        }
    }
}
