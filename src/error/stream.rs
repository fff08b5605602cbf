//! Streaming error types.
//!
//! Every way a stream session can end other than success. All of them are
//! final for the session; retrying means starting a new one.

use thiserror::Error;

use super::category::ErrorCategory;
use super::transport::TransportError;
use crate::sse::SseParseError;
use crate::traits::HttpError;

/// Message used when the server's `error` event carries no `detail`.
pub const DEFAULT_PROTOCOL_ERROR: &str =
    "The server reported an error while generating the response";

/// Stream-specific error variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// Request or response body failed at the HTTP level.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame's data could not be decoded.
    #[error("Failed to parse '{event}' event: {message}")]
    Parse { event: String, message: String },

    /// The server sent an explicit `error` event.
    #[error("{message}")]
    Protocol { message: String },

    /// The caller closed the session before it finished.
    #[error("Stream cancelled")]
    Cancelled,
}

impl StreamError {
    /// Build a protocol error from an `error` event's optional detail.
    ///
    /// An empty string counts as absent. Any other detail, whitespace
    /// included, is kept verbatim.
    pub fn protocol(detail: Option<String>) -> Self {
        let message = detail
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DEFAULT_PROTOCOL_ERROR.to_string());
        StreamError::Protocol { message }
    }

    /// Whether the session ended because the caller closed it.
    ///
    /// Cancellations are expected and should not be shown as errors.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StreamError::Cancelled)
    }

    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            StreamError::Transport(err) => err.category(),
            StreamError::Parse { .. } => ErrorCategory::Client,
            StreamError::Protocol { .. } => ErrorCategory::Server,
            StreamError::Cancelled => ErrorCategory::Cancelled,
        }
    }

    /// Check if starting a new session might succeed.
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::Transport(err) => err.error_code(),
            StreamError::Parse { .. } => "E_STREAM_PARSE",
            StreamError::Protocol { .. } => "E_STREAM_BACKEND",
            StreamError::Cancelled => "E_STREAM_CANCELLED",
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::Transport(err) => err.user_message(),
            StreamError::Parse { event, .. } => {
                format!("Failed to process server message ({}). Please try again.", event)
            }
            StreamError::Protocol { message } => format!("Server error: {}", message),
            StreamError::Cancelled => String::new(),
        }
    }
}

impl From<SseParseError> for StreamError {
    fn from(err: SseParseError) -> Self {
        match err {
            SseParseError::InvalidJson { event, message } => StreamError::Parse { event, message },
        }
    }
}

/// Every HTTP failure is a transport failure. Only a caller's close
/// produces [`StreamError::Cancelled`].
impl From<HttpError> for StreamError {
    fn from(err: HttpError) -> Self {
        StreamError::Transport(err.into())
    }
}
