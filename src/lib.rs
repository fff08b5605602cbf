//! ragchat - streaming client for a retrieval-augmented chat backend
//!
//! Sends a message to a conversation and delivers the answer as it is
//! generated: pipeline phase progress, text tokens, and the final message
//! with its cited sources.
//!
//! ```ignore
//! use ragchat::client::ChatClient;
//! use ragchat::config::ClientConfig;
//! use ragchat::stream::StreamCallbacks;
//!
//! let client = ChatClient::new(ClientConfig::from_env())?;
//! let session = client.stream_message(
//!     "conversation-id",
//!     "What does the manual say about backups?",
//!     StreamCallbacks::new().with_token(|t| print!("{}", t.value)),
//! );
//! let outcome = session.completion().await?;
//! ```

pub mod adapters;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod sse;
pub mod stream;
pub mod traits;
