use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient;

/// One stage of the backend pipeline, announced at stream start
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhaseDefinition {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub label: String,
}

/// Progress report for a single phase.
///
/// Carried by both `phase:update` and `phase:complete`. Everything besides
/// `phase` is opaque metadata and is kept as-is. A missing `phase` is empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PhaseProgress {
    #[serde(default, deserialize_with = "lenient::string")]
    pub phase: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl PhaseProgress {
    /// The `status` metadata field, when the backend sends one
    pub fn status(&self) -> Option<&str> {
        self.metadata.get("status").and_then(Value::as_str)
    }
}
