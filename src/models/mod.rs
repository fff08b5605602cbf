//! Wire types exchanged with the chat backend.

pub(crate) mod lenient;
mod message;
mod phase;
mod request;

pub use message::{parse_timestamp, Author, CitedSource, Message};
pub use phase::{PhaseDefinition, PhaseProgress};
pub use request::{ConversationCreated, CreateMessagePayload};

use serde::{Deserialize, Deserializer};

/// Accept an id sent either as a JSON string or as an integer.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Signed(id) => id.to_string(),
        RawId::Unsigned(id) => id.to_string(),
    })
}
