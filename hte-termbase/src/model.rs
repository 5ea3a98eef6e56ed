use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted bilingual term. `(source_term, target_term, source_lang,
/// target_lang)` is the logical identity; `combined_score` is expected to
/// already satisfy `combined_score = w_conf*confidence + w_qual*quality_score`
/// by the time a term reaches the termbase (BTEP Stage 4 computes it).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Term {
    pub source_term: String,
    pub target_term: String,
    pub source_lang: String,
    pub target_lang: String,
    pub domain: Option<String>,
    pub confidence: f64,
    pub quality_score: f64,
    pub combined_score: f64,
    pub category: Option<String>,
    pub law: Option<String>,
    pub year: Option<i64>,
    pub entry_id: Option<String>,
    pub source_context: Option<String>,
    pub target_context: Option<String>,
    pub occurrence_count: i64,
    pub original_source_term: String,
    pub original_target_term: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Term {
    /// Builds a new term, defaulting `original_source_term`/
    /// `original_target_term` to `source_term`/`target_term` when absent
    /// and stamping both timestamps to `now`, mirroring the original
    /// term dataclass's `__post_init__` defaulting behavior.
    #[must_use]
    pub fn new(source_term: impl Into<String>, target_term: impl Into<String>, source_lang: impl Into<String>, target_lang: impl Into<String>) -> Self {
        let source_term = source_term.into();
        let target_term = target_term.into();
        let now = Utc::now();
        Self {
            original_source_term: source_term.clone(),
            original_target_term: target_term.clone(),
            source_term,
            target_term,
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            domain: None,
            confidence: 0.0,
            quality_score: 0.0,
            combined_score: 0.0,
            category: None,
            law: None,
            year: None,
            entry_id: None,
            source_context: None,
            target_context: None,
            occurrence_count: 1,
            metadata: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TermSearchQuery {
    pub term: String,
    pub search_target: bool,
    pub source_lang: Option<String>,
    pub target_lang: Option<String>,
    pub domain: Option<String>,
    pub exact_match: bool,
    pub limit: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TermStats {
    pub total_terms: i64,
    pub lang_pairs: Vec<(String, String, i64)>,
    pub domains: Vec<(String, i64)>,
    pub avg_confidence: f64,
}
