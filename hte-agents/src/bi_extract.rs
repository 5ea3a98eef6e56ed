use hte_llm::{ChatMessage, ChatRequest, LlmClient};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxPattern {
    pub source_pattern: String,
    pub target_pattern: String,
    pub modality_type: String,
    pub confidence: f64,
    pub context: Option<String>,
}

/// The syntax round's bilingual pattern extractor: unlike `BilingualExtractAgent`
/// (term pairs), this looks for clause-level structural/modality mappings
/// (e.g. "应当" -> "shall") that the syntax layer uses to refine drafts.
pub struct SyntaxBiExtractAgent {
    llm: Arc<dyn LlmClient>,
}

impl SyntaxBiExtractAgent {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn extract(&self, source_text: &str, translation: &str) -> Vec<SyntaxPattern> {
        let system = "You identify legal-syntax pattern mappings (modality, clause structure) between a \
            source sentence and its draft translation. Respond with JSON: {\"patterns\": \
            [{\"source_pattern\": str, \"target_pattern\": str, \"modality_type\": str, \"confidence\": 0..1, \"context\": str}]}.";
        let user = format!("Source: {source_text}\nTranslation: {translation}");

        let request = ChatRequest::new(vec![ChatMessage::system(system), ChatMessage::user(user)]).with_json_mode(true);

        let response = match self.llm.chat(request).await {
            Ok(r) if r.error.is_none() => r,
            _ => return Vec::new(),
        };

        response.parsed_json()["patterns"]
            .as_array()
            .map(|a| a.iter().filter_map(parse_pattern).collect())
            .unwrap_or_default()
    }
}

fn parse_pattern(raw: &serde_json::Value) -> Option<SyntaxPattern> {
    Some(SyntaxPattern {
        source_pattern: raw["source_pattern"].as_str()?.to_string(),
        target_pattern: raw["target_pattern"].as_str()?.to_string(),
        modality_type: raw["modality_type"].as_str().unwrap_or("unknown").to_string(),
        confidence: raw["confidence"].as_f64().unwrap_or(0.5).clamp(0.0, 1.0),
        context: raw["context"].as_str().map(String::from),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hte_llm::StubLlmClient;

    #[tokio::test]
    async fn extract_parses_patterns_from_well_formed_json() {
        let stub = StubLlmClient::new().enqueue_json(serde_json::json!({
            "patterns": [{"source_pattern": "应当", "target_pattern": "shall", "modality_type": "obligation", "confidence": 0.88}]
        }));
        let agent = SyntaxBiExtractAgent::new(Arc::new(stub));

        let patterns = agent.extract("合同双方应当遵守协议", "the parties shall comply with the agreement").await;
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].modality_type, "obligation");
    }

    #[tokio::test]
    async fn extract_degrades_to_empty_on_error() {
        let stub = StubLlmClient::new().enqueue(hte_llm::ChatResponse::error("boom"));
        let agent = SyntaxBiExtractAgent::new(Arc::new(stub));
        assert!(agent.extract("x", "y").await.is_empty());
    }
}
