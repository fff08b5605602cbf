use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::lenient;

/// Who wrote a message
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Author {
    User,
    Agent,
    /// Any author this client does not know, or none at all
    #[default]
    #[serde(other)]
    Unknown,
}

/// A knowledge-base excerpt the agent cited in its answer
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CitedSource {
    #[serde(default, deserialize_with = "lenient::string")]
    pub artifact_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub chunk_content_preview: String,
}

/// A finalized message as stored by the backend.
///
/// Delivered once per stream in the `message:complete` event, and returned by
/// the conversation history endpoint. Decoding never fails on a JSON
/// object: fields that are missing or of another type fall back to empty
/// values, and an unreadable `created_at` is `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Message {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub conversation_id: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub author: Author,
    #[serde(default, deserialize_with = "lenient::string")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub cited_sources: Vec<CitedSource>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Whether the message was produced by the agent
    pub fn is_from_agent(&self) -> bool {
        self.author == Author::Agent
    }
}

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 and the offset-less ISO 8601 form the backend emits for
/// naive UTC datetimes (e.g. `2024-01-01T00:00:00.123456`).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}
