use hte_llm::{ChatMessage, ChatRequest, LlmClient};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SelectionResult {
    pub selected_index: usize,
    pub confidence: f64,
    pub reason: String,
}

/// Picks the best of several candidate translations with an LLM judge.
/// Every failure mode falls back to index 0 rather than aborting the
/// round, since candidate 0 is always a valid translation (either the
/// incoming prior, for rounds that prepend it, or the first draft).
pub struct CandidateSelector {
    llm: Arc<dyn LlmClient>,
}

impl CandidateSelector {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn select(&self, source_text: &str, candidates: &[String]) -> SelectionResult {
        if candidates.len() <= 1 {
            return SelectionResult { selected_index: 0, confidence: 1.0, reason: "single candidate, no judging needed".to_string() };
        }

        let system = "You judge several candidate translations of a legal sentence and pick the best one. \
            Respond with JSON: {\"selected_index\": int, \"confidence\": 0..1, \"reason\": str}.";
        let listed = candidates.iter().enumerate().map(|(i, c)| format!("[{i}] {c}")).collect::<Vec<_>>().join("\n");
        let user = format!("Source: {source_text}\nCandidates:\n{listed}");

        let request = ChatRequest::new(vec![ChatMessage::system(system), ChatMessage::user(user)]).with_json_mode(true);

        let response = match self.llm.chat(request).await {
            Ok(r) if r.error.is_none() => r,
            Ok(r) => {
                return SelectionResult {
                    selected_index: 0,
                    confidence: 0.5,
                    reason: format!("llm error, defaulted to candidate 0: {}", r.error.unwrap_or_default()),
                };
            }
            Err(e) => {
                return SelectionResult { selected_index: 0, confidence: 0.5, reason: format!("llm call failed, defaulted to candidate 0: {e}") };
            }
        };

        let value = response.parsed_json();
        let raw_index = value["selected_index"].as_i64();
        match raw_index {
            Some(idx) if idx >= 0 && (idx as usize) < candidates.len() => SelectionResult {
                selected_index: idx as usize,
                confidence: value["confidence"].as_f64().unwrap_or(0.5).clamp(0.0, 1.0),
                reason: value["reason"].as_str().unwrap_or("").to_string(),
            },
            _ => SelectionResult {
                selected_index: 0,
                confidence: 0.5,
                reason: "selected_index out of range, defaulted to candidate 0".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hte_llm::StubLlmClient;

    #[tokio::test]
    async fn single_candidate_shortcuts_without_calling_the_llm() {
        let agent = CandidateSelector::new(Arc::new(StubLlmClient::new()));
        let result = agent.select("source", &["only one".to_string()]).await;
        assert_eq!(result.selected_index, 0);
        assert_eq!(result.confidence, 1.0);
    }

    #[tokio::test]
    async fn selects_index_from_well_formed_response() {
        let stub = StubLlmClient::new().enqueue_json(serde_json::json!({
            "selected_index": 1, "confidence": 0.77, "reason": "better terminology"
        }));
        let agent = CandidateSelector::new(Arc::new(stub));

        let result = agent.select("source", &["a".to_string(), "b".to_string()]).await;
        assert_eq!(result.selected_index, 1);
        assert!((result.confidence - 0.77).abs() < 1e-9);
    }

    #[tokio::test]
    async fn out_of_range_index_falls_back_to_zero_with_half_confidence() {
        let stub = StubLlmClient::new().enqueue_json(serde_json::json!({ "selected_index": 9, "confidence": 0.9 }));
        let agent = CandidateSelector::new(Arc::new(stub));

        let result = agent.select("source", &["a".to_string(), "b".to_string()]).await;
        assert_eq!(result.selected_index, 0);
        assert_eq!(result.confidence, 0.5);
    }

    #[tokio::test]
    async fn llm_error_falls_back_to_zero_with_half_confidence() {
        let stub = StubLlmClient::new().enqueue(hte_llm::ChatResponse::error("boom"));
        let agent = CandidateSelector::new(Arc::new(stub));

        let result = agent.select("source", &["a".to_string(), "b".to_string()]).await;
        assert_eq!(result.selected_index, 0);
        assert_eq!(result.confidence, 0.5);
    }
}
