use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}
