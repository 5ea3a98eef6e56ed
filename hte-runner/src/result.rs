use crate::metrics::LocalMetrics;
use hte_translator::Trace;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SampleResult {
    pub sample_id: String,
    pub source: String,
    pub target: String,
    pub prediction: String,
    pub success: bool,
    pub metrics: Option<LocalMetrics>,
    pub trace: Option<Trace>,
    pub metadata: serde_json::Value,
    pub error: Option<String>,
}

pub const EMPTY_TRANSLATION_ERROR: &str = "Empty translation result";
