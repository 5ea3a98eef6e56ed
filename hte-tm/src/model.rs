use serde::{Deserialize, Serialize};

/// A translation-memory record. Identity is `hte_core::hashing::tm_entry_id`
/// over `(source_lang, target_lang, source_text, target_text)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmEntry {
    pub id: String,
    pub source_text: String,
    pub target_text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_vector: Option<Vec<f32>>,
    pub context: Option<String>,
    pub metadata: serde_json::Value,
}

impl TmEntry {
    #[must_use]
    pub fn new(source_text: impl Into<String>, target_text: impl Into<String>, source_lang: impl Into<String>, target_lang: impl Into<String>) -> Self {
        let source_text = source_text.into();
        let target_text = target_text.into();
        let source_lang = source_lang.into();
        let target_lang = target_lang.into();
        let id = hte_core::hashing::tm_entry_id(&source_lang, &target_lang, &source_text, &target_text);
        Self {
            id,
            source_text,
            target_text,
            source_lang,
            target_lang,
            domain: None,
            source_vector: None,
            context: None,
            metadata: serde_json::json!({}),
        }
    }

    /// The `text` field stored alongside the vector collection row:
    /// `source|||target`.
    #[must_use]
    pub fn combined_text(&self) -> String {
        format!("{}|||{}", self.source_text, self.target_text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmMatch {
    pub id: String,
    pub source_text: String,
    pub target_text: String,
    pub similarity_score: f64,
    pub context: Option<String>,
    pub legal_domain: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TmStats {
    pub bm25_entries: usize,
    pub bm25_available: bool,
    pub milvus_available: bool,
    pub milvus_entries: usize,
}
