use hte_llm::{ChatMessage, ChatRequest, LlmClient};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SyntaxEvaluation {
    pub overall_score: f64,
    pub structural_fidelity: f64,
    pub issues: Vec<String>,
}

/// Scores clause-structure and modality fidelity of a draft translation,
/// feeding the syntax-layer gating decision.
pub struct SyntaxEvaluateAgent {
    llm: Arc<dyn LlmClient>,
}

impl SyntaxEvaluateAgent {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn evaluate(&self, source_text: &str, translation: &str) -> SyntaxEvaluation {
        let system = "You evaluate syntactic and modality fidelity of a legal translation. \
            Respond with JSON: {\"overall_score\": 0..1, \"structural_fidelity\": 0..1, \"issues\": [str]}.";
        let user = format!("Source: {source_text}\nTranslation: {translation}");

        let request = ChatRequest::new(vec![ChatMessage::system(system), ChatMessage::user(user)]).with_json_mode(true);

        let response = match self.llm.chat(request).await {
            Ok(r) if r.error.is_none() => r,
            _ => return SyntaxEvaluation::default(),
        };

        let value = response.parsed_json();
        SyntaxEvaluation {
            overall_score: value["overall_score"].as_f64().unwrap_or(0.0).clamp(0.0, 1.0),
            structural_fidelity: value["structural_fidelity"].as_f64().unwrap_or(0.0).clamp(0.0, 1.0),
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
            "overall_score": 0.91, "structural_fidelity": 0.95, "issues": []
        }));
        let agent = SyntaxEvaluateAgent::new(Arc::new(stub));

        let result = agent.evaluate("合同双方应当遵守协议", "the parties shall comply with the agreement").await;
        assert!((result.overall_score - 0.91).abs() < 1e-9);
    }
}
