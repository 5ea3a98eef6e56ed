use hte_agents::AttributedTerm;
use serde::{Deserialize, Serialize};

/// Stage 2 output: an extracted term plus its judged quality score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityCheckedTerm {
    pub term: AttributedTerm,
    pub quality_score: f64,
}

/// Stage 3 output: a quality-checked term with its normalized source and
/// target surface forms attached (identical to the originals when
/// normalization was rejected by the language validator).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedTerm {
    pub term: QualityCheckedTerm,
    pub normalized_source: String,
    pub normalized_target: String,
}

/// Stage 4 output: the canonical, termbase-ready record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardizedTerm {
    pub normalized_source: String,
    pub normalized_target: String,
    pub source_lang: String,
    pub target_lang: String,
    pub confidence: f64,
    pub quality_score: f64,
    pub combined_score: f64,
    pub category: Option<String>,
    pub domain: Option<String>,
    pub law: Option<String>,
    pub year: Option<i64>,
    pub occurrence_count: i64,
    pub entry_id: Option<String>,
}
