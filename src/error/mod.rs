//! Error handling for ragchat.
//!
//! - **Error Categories**: High-level classification for handling decisions
//! - **Transport Errors**: HTTP status, missing body, network failures
//! - **Stream Errors**: everything that can end a stream session early
//!
//! # Error taxonomy
//!
//! | Variant | Source | Calls `on_error` |
//! |---------|--------|------------------|
//! | `StreamError::Transport` | non-2xx status, no body, dropped connection | yes |
//! | `StreamError::Parse` | `data:` that is not valid JSON for its event | yes |
//! | `StreamError::Protocol` | explicit `error` event from the server | yes |
//! | `StreamError::Cancelled` | caller invoked `close()` | no |

mod category;
mod stream;
mod transport;

pub use category::ErrorCategory;
pub use stream::{StreamError, DEFAULT_PROTOCOL_ERROR};
pub use transport::TransportError;

/// Result of a whole stream session
pub type StreamResult<T> = Result<T, StreamError>;
