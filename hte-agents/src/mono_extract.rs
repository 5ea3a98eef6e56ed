use hte_llm::{ChatMessage, ChatRequest, LlmClient};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonoTerm {
    pub term: String,
    pub score: f64,
    pub category: String,
}

/// Extracts candidate legal terms from a monolingual source sentence. No
/// external state; degrades to an empty list on any JSON-shape failure.
pub struct MonoExtractAgent {
    llm: Arc<dyn LlmClient>,
}

impl MonoExtractAgent {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn extract(&self, text: &str) -> Vec<MonoTerm> {
        let system = "You extract candidate legal terminology from a single sentence. \
            Respond with JSON: {\"terms\": [{\"term\": str, \"score\": 0..1, \"category\": str}]}.";
        let request = ChatRequest::new(vec![ChatMessage::system(system), ChatMessage::user(text.to_string())])
            .with_json_mode(true);

        let response = match self.llm.chat(request).await {
            Ok(r) if r.error.is_none() => r,
            _ => return Vec::new(),
        };

        let value = response.parsed_json();
        value["terms"]
            .as_array()
            .map(|terms| terms.iter().filter_map(parse_term).collect())
            .unwrap_or_default()
    }
}

fn parse_term(raw: &serde_json::Value) -> Option<MonoTerm> {
    Some(MonoTerm {
        term: raw["term"].as_str()?.to_string(),
        score: raw["score"].as_f64().unwrap_or(0.5).clamp(0.0, 1.0),
        category: raw["category"].as_str().unwrap_or("unknown").to_string(),
    })
}
