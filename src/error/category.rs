//! Coarse grouping of stream failures.

use std::fmt;

/// Which side of the conversation a failure came from.
///
/// Used for log fields and to decide whether sending the message again can
/// help.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// No usable connection: refused, reset, timed out.
    Network,
    /// The backend answered with a 5xx or an `error` event.
    Server,
    /// A 4xx, or stream content this client cannot decode.
    Client,
    /// The base URL does not parse.
    Configuration,
    /// The caller closed the session.
    Cancelled,
}

impl ErrorCategory {
    /// Whether the same request may succeed if sent again unchanged.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Server)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Server => "server",
            Self::Client => "client",
            Self::Configuration => "configuration",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
