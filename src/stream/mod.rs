//! Streaming sessions.
//!
//! Turns a chunked response body into ordered handler callbacks with a
//! single completion result.
//!
//! # Module structure
//! - `handler` - Consumer callbacks (StreamHandler, StreamCallbacks)
//! - `dispatch` - Event routing state machine (Dispatcher)
//! - `session` - Session task, close handle and completion (StreamSession)

mod dispatch;
mod handler;
mod session;

pub use dispatch::{Dispatch, DispatchState, Dispatcher};
pub use handler::{StreamCallbacks, StreamHandler};
pub use session::{CloseHandle, StreamOutcome, StreamSession};
