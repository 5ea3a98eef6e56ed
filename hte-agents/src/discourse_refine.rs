use hte_llm::{ChatMessage, ChatRequest, LlmClient};
use std::sync::Arc;

/// Rewrites a draft translation for discourse coherence against filtered
/// translation-memory references, producing `num_candidates` alternatives.
/// Every round that supports candidate selection must expose the
/// unmodified incoming translation as candidate 0 so the selector can
/// always fall back to "do nothing" — this agent enforces that by
/// prepending it itself rather than trusting callers to remember.
pub struct DiscourseRefineAgent {
    llm: Arc<dyn LlmClient>,
}

impl DiscourseRefineAgent {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn refine_candidates(&self, source_text: &str, prior_translation: &str, tm_references: &[String], num_candidates: usize) -> Vec<String> {
        let mut candidates = vec![prior_translation.to_string()];

        let system = format!(
            "You refine a legal translation for discourse coherence using these translation-memory \
             references: {}. Respond with JSON: {{\"translation\": str}}.",
            tm_references.join(" | ")
        );

        for _ in 0..num_candidates.saturating_sub(1) {
            let request = ChatRequest::new(vec![
                ChatMessage::system(system.clone()),
                ChatMessage::user(format!("Source: {source_text}\nCurrent translation: {prior_translation}")),
            ])
            .with_json_mode(true)
            .with_temperature(0.7);

            match self.llm.chat(request).await {
                Ok(r) if r.error.is_none() => {
                    if let Some(text) = r.parsed_json()["translation"].as_str() {
                        candidates.push(text.to_string());
                    }
                }
                _ => continue,
            }
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hte_llm::StubLlmClient;

    #[tokio::test]
    async fn candidate_zero_is_always_the_unmodified_prior_translation() {
        let stub = StubLlmClient::new().enqueue_json(serde_json::json!({ "translation": "refined version" }));
        let agent = DiscourseRefineAgent::new(Arc::new(stub));

        let candidates = agent.refine_candidates("source", "prior translation", &[], 2).await;
        assert_eq!(candidates[0], "prior translation");
        assert_eq!(candidates[1], "refined version");
    }

    #[tokio::test]
    async fn num_candidates_one_yields_only_the_prior_translation() {
        let stub = StubLlmClient::new();
        let agent = DiscourseRefineAgent::new(Arc::new(stub));

        let candidates = agent.refine_candidates("source", "prior translation", &[], 1).await;
        assert_eq!(candidates, vec!["prior translation".to_string()]);
    }
}
