//! SSE event types.
//!
//! A frame is first parsed into an untyped [`ParsedEvent`] (name + JSON
//! payload), then converted into a typed [`StreamEvent`] for dispatch.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::payloads::{ErrorPayload, PhaseStartPayload, TokenPayload};
use crate::models::{Message, PhaseDefinition, PhaseProgress};

pub const PHASE_START: &str = "phase:start";
pub const PHASE_UPDATE: &str = "phase:update";
pub const PHASE_COMPLETE: &str = "phase:complete";
pub const TOKEN: &str = "token";
pub const MESSAGE_COMPLETE: &str = "message:complete";
pub const ERROR: &str = "error";

/// Represents a parsed SSE line
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// Event name declaration (e.g., "event: token")
    Event(String),
    /// Data payload fragment (e.g., "data: {\"value\": \"hi\"}")
    Data(String),
    /// Anything else, ignored
    Other,
}

/// One frame's event name and its JSON-decoded data
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEvent {
    pub name: String,
    pub payload: Value,
}

/// Errors raised while turning frames into events
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SseParseError {
    /// The concatenated `data:` lines are not valid JSON
    #[error("Invalid JSON for event '{event}': {message}")]
    InvalidJson { event: String, message: String },
}

impl SseParseError {
    /// Name of the event whose frame failed to parse
    pub fn event(&self) -> &str {
        match self {
            SseParseError::InvalidJson { event, .. } => event,
        }
    }
}

/// Typed events of the response stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// The pipeline announced its phases
    PhaseStart(Vec<PhaseDefinition>),
    /// A phase reported intermediate progress
    PhaseUpdate(PhaseProgress),
    /// A phase finished
    PhaseComplete(PhaseProgress),
    /// One increment of generated text
    Token(TokenPayload),
    /// The finalized message; ends the stream successfully
    MessageComplete(Message),
    /// The server gave up; ends the stream with a failure
    Error(ErrorPayload),
    /// An event name this client does not know
    Unknown { name: String },
}

impl StreamEvent {
    /// Convert a parsed frame into a typed event.
    ///
    /// Never fails: the JSON was already validated by the parser, and
    /// fields of an unexpected shape decode to empty values. Unknown names
    /// are preserved so newer servers can add events without breaking older
    /// clients.
    pub fn from_parsed(event: ParsedEvent) -> Self {
        let ParsedEvent { name, payload } = event;

        match name.as_str() {
            PHASE_START => {
                StreamEvent::PhaseStart(decode::<PhaseStartPayload>(&name, payload).phases)
            }
            PHASE_UPDATE => StreamEvent::PhaseUpdate(decode(&name, payload)),
            PHASE_COMPLETE => StreamEvent::PhaseComplete(decode(&name, payload)),
            TOKEN => StreamEvent::Token(decode(&name, payload)),
            MESSAGE_COMPLETE => StreamEvent::MessageComplete(decode(&name, payload)),
            ERROR => StreamEvent::Error(decode(&name, payload)),
            _ => StreamEvent::Unknown { name },
        }
    }

    /// Get the wire name of this event
    pub fn event_type_name(&self) -> &str {
        match self {
            StreamEvent::PhaseStart(_) => PHASE_START,
            StreamEvent::PhaseUpdate(_) => PHASE_UPDATE,
            StreamEvent::PhaseComplete(_) => PHASE_COMPLETE,
            StreamEvent::Token(_) => TOKEN,
            StreamEvent::MessageComplete(_) => MESSAGE_COMPLETE,
            StreamEvent::Error(_) => ERROR,
            StreamEvent::Unknown { name } => name,
        }
    }

    /// Whether this event ends the stream
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::MessageComplete(_) | StreamEvent::Error(_))
    }
}

/// Decode a payload whose fields are all lenient. Only a payload that is not
/// a JSON object can miss, and it is treated like `{}`.
fn decode<T: DeserializeOwned + Default>(event: &str, payload: Value) -> T {
    serde_json::from_value(payload).unwrap_or_else(|e| {
        debug!("Payload of '{}' is not an object ({}), using defaults", event, e);
        T::default()
    })
}
