//! SSE (Server-Sent Events) stream parsing
//!
//! Parses the event stream the chat backend sends while it answers.
//! The format consists of:
//! - `event: <name>` - event name line
//! - `data: <json>` - data payload line(s), concatenated without separator
//! - Blank line (`\n\n`) - ends the frame
//! - Any other line - ignored
//!
//! # Module structure
//! - `decoder` - UTF-8 decoding across chunk boundaries (Utf8Decoder)
//! - `splitter` - Frame buffering on blank lines (FrameSplitter)
//! - `parser` - Frame parsing (parse_frame, parse_sse_line)
//! - `events` - Event types (ParsedEvent, StreamEvent, SseParseError)
//! - `payloads` - Payload deserialization structs

mod decoder;
mod events;
mod parser;
mod payloads;
mod splitter;

pub use decoder::Utf8Decoder;
pub use events::{
    ParsedEvent, SseLine, SseParseError, StreamEvent, ERROR, MESSAGE_COMPLETE, PHASE_COMPLETE,
    PHASE_START, PHASE_UPDATE, TOKEN,
};
pub use parser::{parse_frame, parse_sse_line};
pub use payloads::{ErrorPayload, TokenPayload};
pub use splitter::{FrameSplitter, FRAME_SEPARATOR};
