//! Transport-level error types.
//!
//! Failures of the HTTP exchange itself: bad status, unreadable body,
//! dropped connections.

use thiserror::Error;

use super::category::ErrorCategory;
use crate::traits::HttpError;

/// Errors raised by the HTTP transport before or while reading a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("Server returned HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// The response succeeded but has no body that can be read incrementally.
    #[error("Stream unsupported: response has no readable body")]
    StreamUnsupported,

    /// Connection could not be established or broke mid-response.
    #[error("Network failure: {message}")]
    Network { message: String },

    /// The request timed out.
    #[error("Request timed out: {message}")]
    Timeout { message: String },

    /// The configured URL is not usable.
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// A non-streaming response body could not be decoded.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },
}

impl TransportError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            TransportError::HttpStatus { status, .. } if *status >= 500 => ErrorCategory::Server,
            TransportError::HttpStatus { .. } => ErrorCategory::Client,
            TransportError::StreamUnsupported | TransportError::InvalidResponse { .. } => {
                ErrorCategory::Server
            }
            TransportError::Network { .. } | TransportError::Timeout { .. } => {
                ErrorCategory::Network
            }
            TransportError::InvalidUrl { .. } => ErrorCategory::Configuration,
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            TransportError::HttpStatus { .. } => "E_TRANSPORT_STATUS",
            TransportError::StreamUnsupported => "E_TRANSPORT_NO_BODY",
            TransportError::Network { .. } => "E_TRANSPORT_NETWORK",
            TransportError::Timeout { .. } => "E_TRANSPORT_TIMEOUT",
            TransportError::InvalidUrl { .. } => "E_TRANSPORT_URL",
            TransportError::InvalidResponse { .. } => "E_TRANSPORT_RESPONSE",
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            TransportError::HttpStatus { status, .. } if *status == 404 => {
                "The conversation was not found on the server.".to_string()
            }
            TransportError::HttpStatus { status, .. } => {
                format!("The server rejected the request (HTTP {}).", status)
            }
            TransportError::StreamUnsupported => {
                "The server response cannot be streamed.".to_string()
            }
            TransportError::Network { .. } => {
                "Could not reach the server. Check your connection.".to_string()
            }
            TransportError::Timeout { .. } => "The server took too long to respond.".to_string(),
            TransportError::InvalidUrl { url, .. } => {
                format!("The API address '{}' is not valid.", url)
            }
            TransportError::InvalidResponse { .. } => {
                "Received an unexpected response from the server.".to_string()
            }
        }
    }
}

impl From<HttpError> for TransportError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::ServerError { status, message } => {
                TransportError::HttpStatus { status, message }
            }
            HttpError::Timeout(message) => TransportError::Timeout { message },
            HttpError::InvalidUrl(message) => TransportError::InvalidUrl {
                url: String::new(),
                message,
            },
            HttpError::ConnectionFailed(message) | HttpError::Io(message) | HttpError::Other(message) => {
                TransportError::Network { message }
            }
        }
    }
}
