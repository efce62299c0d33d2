use serde::{Deserialize, Serialize};

/// Identification record as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantInfo {
    pub common_name: String,
    pub scientific_name: String,
    pub description: String,
    pub care_instructions: String,
    pub ideal_conditions: String,
}
