use serde::{Deserialize, Serialize};

use super::deserialize_id;

/// Body of a message post, streamed or not
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateMessagePayload {
    pub content: String,
}

impl CreateMessagePayload {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Response of `POST /conversations`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationCreated {
    #[serde(deserialize_with = "deserialize_id")]
    pub conversation_id: String,
}
