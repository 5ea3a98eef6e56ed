use hte_llm::{ChatMessage, ChatRequest, LlmClient};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DiscourseEvaluation {
    pub overall_score: f64,
    pub coherence_score: f64,
    pub issues: Vec<String>,
}

/// Scores discourse-level coherence (register, cross-reference, TM
/// consistency) of a draft translation, feeding the discourse-layer gating
/// decision.
pub struct DiscourseEvaluateAgent {
    llm: Arc<dyn LlmClient>,
}

impl DiscourseEvaluateAgent {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn evaluate(&self, source_text: &str, translation: &str, tm_references: &[String]) -> DiscourseEvaluation {
        let system = "You evaluate discourse-level coherence of a legal translation against reference \
            translation-memory entries. Respond with JSON: {\"overall_score\": 0..1, \"coherence_score\": 0..1, \"issues\": [str]}.";
        let user = format!(
            "Source: {source_text}\nTranslation: {translation}\nTM references: {}",
            tm_references.join(" | ")
        );

        let request = ChatRequest::new(vec![ChatMessage::system(system), ChatMessage::user(user)]).with_json_mode(true);

        let response = match self.llm.chat(request).await {
            Ok(r) if r.error.is_none() => r,
            _ => return DiscourseEvaluation::default(),
        };

        let value = response.parsed_json();
        DiscourseEvaluation {
            overall_score: value["overall_score"].as_f64().unwrap_or(0.0).clamp(0.0, 1.0),
            coherence_score: value["coherence_score"].as_f64().unwrap_or(0.0).clamp(0.0, 1.0),
            issues: value["issues"]
                .as_array()
                .map(|a| a.iter().filter_map(|v| v.as_str().map(String::from)).collect())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hte_llm::StubLlmClient;

    #[tokio::test]
    async fn evaluate_parses_well_formed_response() {
        let stub = StubLlmClient::new().enqueue_json(serde_json::json!({
            "overall_score": 0.88, "coherence_score": 0.9, "issues": []
        }));
        let agent = DiscourseEvaluateAgent::new(Arc::new(stub));

        let result = agent.evaluate("source", "translation", &["reference entry".to_string()]).await;
        assert!((result.overall_score - 0.88).abs() < 1e-9);
    }
}
