use serde::{Deserialize, Serialize};

pub const UNKNOWN_COMMON_NAME: &str = "Unknown Plant";
pub const UNKNOWN_SCIENTIFIC_NAME: &str = "Not identified";
pub const NOT_AVAILABLE: &str = "Not available";

/// The five-field identification returned to callers.
///
/// Built once per request, either from the model's JSON reply or from
/// [`PlantIdentification::fallback`], and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantIdentification {
    pub common_name: String,
    pub scientific_name: String,
    pub description: String,
    pub care_instructions: String,
    pub ideal_conditions: String,
}

impl PlantIdentification {
    /// Record used when the model answered but not in the expected shape.
    /// The reply is kept verbatim as the description.
    pub fn fallback(raw_reply: &str) -> Self {
        Self {
            common_name: UNKNOWN_COMMON_NAME.to_string(),
            scientific_name: UNKNOWN_SCIENTIFIC_NAME.to_string(),
            description: raw_reply.to_string(),
            care_instructions: NOT_AVAILABLE.to_string(),
            ideal_conditions: NOT_AVAILABLE.to_string(),
        }
    }
}
