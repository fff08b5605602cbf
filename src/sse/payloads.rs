//! SSE payload deserialization structs
//!
//! Typed shapes of the JSON carried in `data:` lines, one per known event.

use serde::{Deserialize, Serialize};

use crate::models::lenient;
use crate::models::PhaseDefinition;

/// `phase:start` payload: the phases the pipeline will go through
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PhaseStartPayload {
    #[serde(default, deserialize_with = "lenient::list")]
    pub phases: Vec<PhaseDefinition>,
}

/// `token` payload: one increment of generated text
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPayload {
    #[serde(default, deserialize_with = "lenient::string")]
    pub value: String,
}

/// `error` payload sent by the server before it gives up
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorPayload {
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub detail: Option<String>,
}
