use hte_llm::{ChatMessage, ChatRequest, LlmClient};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedTermPair {
    pub source_term: String,
    pub target_term: String,
    pub confidence: f64,
    pub category: Option<String>,
    pub source_context: Option<String>,
    pub target_context: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPairEntry {
    pub source_text: String,
    pub target_text: String,
    pub law: Option<String>,
    pub domain: Option<String>,
    pub year: Option<i64>,
    pub entry_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributedTerm {
    pub source_term: String,
    pub target_term: String,
    pub confidence: f64,
    pub category: Option<String>,
    pub source_context: Option<String>,
    pub target_context: Option<String>,
    pub law: Option<String>,
    pub domain: Option<String>,
    pub year: Option<i64>,
    pub entry_id: Option<String>,
}

/// Extracts bilingual term pairs from one (single-pair) or many
/// (batch-mode, used by BTEP Stage 1) source/target sentence pairs.
pub struct BilingualExtractAgent {
    llm: Arc<dyn LlmClient>,
}

impl BilingualExtractAgent {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn extract_single(&self, source_text: &str, target_text: &str, src_lang: &str, tgt_lang: &str) -> Vec<ExtractedTermPair> {
        let batch = self.extract_batch(&[(source_text.to_string(), target_text.to_string())], src_lang, tgt_lang, 1).await;
        batch.into_iter().next().unwrap_or_default()
    }

    /// Batch mode: one LLM call for up to `batch_size` text pairs, returns
    /// one term list per pair in input order.
    pub async fn extract_batch(&self, text_pairs: &[(String, String)], src_lang: &str, tgt_lang: &str, batch_size: usize) -> Vec<Vec<ExtractedTermPair>> {
        if text_pairs.is_empty() {
            return Vec::new();
        }

        let system = format!(
            "You extract bilingual legal term pairs ({src_lang}->{tgt_lang}) from parallel sentences. \
             Respond with JSON: {{\"results\": [[{{\"source_term\": str, \"target_term\": str, \
             \"confidence\": 0..1, \"category\": str}}]]}} with one inner array per input pair, in order."
        );
        let user = text_pairs
            .iter()
            .take(batch_size.max(1))
            .enumerate()
            .map(|(i, (src, tgt))| format!("[{i}] source: {src}\n[{i}] target: {tgt}"))
            .collect::<Vec<_>>()
            .join("\n\n");

        let request =
            ChatRequest::new(vec![ChatMessage::system(system), ChatMessage::user(user)]).with_json_mode(true);

        let response = match self.llm.chat(request).await {
            Ok(r) if r.error.is_none() => r,
            _ => return vec![Vec::new(); text_pairs.len()],
        };

        let value = response.parsed_json();
        let Some(results) = value["results"].as_array() else { return vec![Vec::new(); text_pairs.len()] };

        (0..text_pairs.len())
            .map(|i| {
                results
                    .get(i)
                    .and_then(|v| v.as_array())
                    .map(|terms| terms.iter().filter_map(parse_pair).collect())
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Attaches per-entry metadata (law/domain/year/entry_id) to each term
    /// extracted from a micro-batch, matching by substring presence of the
    /// term in the entry's source/target text; falls back to the first
    /// entry in the micro-batch when no entry matches (a known source of
    /// metadata noise, kept per the spec's open question).
    #[must_use]
    pub fn attribute_terms(terms: Vec<ExtractedTermPair>, entries: &[TextPairEntry]) -> Vec<AttributedTerm> {
        terms
            .into_iter()
            .map(|term| {
                let owner = entries
                    .iter()
                    .find(|e| e.source_text.contains(&term.source_term) || e.target_text.contains(&term.target_term))
                    .or_else(|| entries.first());

                AttributedTerm {
                    source_term: term.source_term,
                    target_term: term.target_term,
                    confidence: term.confidence,
                    category: term.category,
                    source_context: term.source_context,
                    target_context: term.target_context,
                    law: owner.and_then(|e| e.law.clone()),
                    domain: owner.and_then(|e| e.domain.clone()),
                    year: owner.and_then(|e| e.year),
                    entry_id: owner.and_then(|e| e.entry_id.clone()),
                }
            })
            .collect()
    }
}

fn parse_pair(raw: &serde_json::Value) -> Option<ExtractedTermPair> {
    Some(ExtractedTermPair {
        source_term: raw["source_term"].as_str()?.to_string(),
        target_term: raw["target_term"].as_str()?.to_string(),
        confidence: raw["confidence"].as_f64().unwrap_or(0.5).clamp(0.0, 1.0),
        category: raw["category"].as_str().map(String::from),
        source_context: raw["source_context"].as_str().map(String::from),
        target_context: raw["target_context"].as_str().map(String::from),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hte_llm::StubLlmClient;

    #[tokio::test]
    async fn batch_mode_returns_one_term_list_per_pair_in_order() {
        let stub = StubLlmClient::new().enqueue_json(serde_json::json!({
            "results": [
                [{"source_term": "合同", "target_term": "contract", "confidence": 0.9}],
                [],
            ]
        }));
        let agent = BilingualExtractAgent::new(Arc::new(stub));

        let pairs = vec![("合同".to_string(), "contract".to_string()), ("天气".to_string(), "weather".to_string())];
        let results = agent.extract_batch(&pairs, "zh", "en", 2).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].len(), 1);
        assert!(results[1].is_empty());
    }

    #[test]
    fn attribute_terms_falls_back_to_first_entry_when_no_match() {
        let terms = vec![ExtractedTermPair {
            source_term: "违约金".to_string(),
            target_term: "liquidated damages".to_string(),
            confidence: 0.8,
            category: None,
            source_context: None,
            target_context: None,
        }];
        let entries = vec![TextPairEntry {
            source_text: "完全不相关的句子".to_string(),
            target_text: "a completely unrelated sentence".to_string(),
            law: Some("Contract Law".to_string()),
            domain: Some("civil".to_string()),
            year: Some(1999),
            entry_id: Some("e1".to_string()),
        }];

        let attributed = BilingualExtractAgent::attribute_terms(terms, &entries);
        assert_eq!(attributed[0].law.as_deref(), Some("Contract Law"));
    }

    #[test]
    fn attribute_terms_matches_by_substring_when_possible() {
        let terms = vec![ExtractedTermPair {
            source_term: "合同".to_string(),
            target_term: "contract".to_string(),
            confidence: 0.8,
            category: None,
            source_context: None,
            target_context: None,
        }];
        let entries = vec![
            TextPairEntry {
                source_text: "不包含的句子".to_string(),
                target_text: "unrelated".to_string(),
                law: Some("Wrong Law".to_string()),
                domain: None,
                year: None,
                entry_id: Some("wrong".to_string()),
            },
            TextPairEntry {
                source_text: "合同应当有效".to_string(),
                target_text: "the contract shall be valid".to_string(),
                law: Some("Contract Law".to_string()),
                domain: None,
                year: None,
                entry_id: Some("right".to_string()),
            },
        ];

        let attributed = BilingualExtractAgent::attribute_terms(terms, &entries);
        assert_eq!(attributed[0].entry_id.as_deref(), Some("right"));
    }
}
