//! Frame parsing.
//!
//! A frame holds `event:` and `data:` lines for one logical event. Multiple
//! `data:` lines are concatenated without a separator before JSON decoding.

use serde_json::{Map, Value};
use tracing::trace;

use super::events::{ParsedEvent, SseLine, SseParseError};

/// Parse a single SSE line into its component type
pub fn parse_sse_line(line: &str) -> SseLine {
    let line = line.strip_suffix('\r').unwrap_or(line);

    if let Some(rest) = line.strip_prefix("event:") {
        return SseLine::Event(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("data:") {
        return SseLine::Data(rest.trim().to_string());
    }

    SseLine::Other
}

/// Parse one frame into an event.
///
/// Returns:
/// - `Ok(Some(event))` - the frame named an event
/// - `Ok(None)` - no (or an empty) event name; the frame is skipped
/// - `Err(error)` - the data is present but is not valid JSON
///
/// A frame without data gets an empty JSON object as payload.
pub fn parse_frame(frame: &str) -> Result<Option<ParsedEvent>, SseParseError> {
    let mut name: Option<String> = None;
    let mut data = String::new();

    for line in frame.split('\n') {
        match parse_sse_line(line) {
            SseLine::Event(event) => name = Some(event),
            SseLine::Data(chunk) => data.push_str(&chunk),
            SseLine::Other => {}
        }
    }

    let name = match name {
        Some(name) if !name.is_empty() => name,
        _ => {
            trace!(frame, "Skipping frame without event name");
            return Ok(None);
        }
    };

    let payload = if data.is_empty() {
        Value::Object(Map::new())
    } else {
        serde_json::from_str(&data).map_err(|e| SseParseError::InvalidJson {
            event: name.clone(),
            message: e.to_string(),
        })?
    };

    Ok(Some(ParsedEvent { name, payload }))
}
