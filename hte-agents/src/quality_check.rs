use hte_llm::{ChatMessage, ChatRequest, LlmClient};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct QualityVerdict {
    pub is_valid: bool,
    pub quality_score: f64,
}

/// BTEP Stage 2: judges a chunk of extracted term pairs against shared
/// source/target context, independent of which micro-batch originally
/// produced each term.
pub struct QualityCheckAgent {
    llm: Arc<dyn LlmClient>,
}

impl QualityCheckAgent {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn check_batch(&self, pairs: &[(String, String)], source_context: &str, target_context: &str) -> Vec<QualityVerdict> {
        if pairs.is_empty() {
            return Vec::new();
        }

        let system = "You judge whether each bilingual legal term pair is a valid, high-quality translation \
            given shared source/target context. Respond with JSON: {\"verdicts\": [{\"is_valid\": bool, \"quality_score\": 0..1}]}.";
        let listed = pairs.iter().enumerate().map(|(i, (s, t))| format!("[{i}] {s} -> {t}")).collect::<Vec<_>>().join("\n");
        let user = format!("Source context: {source_context}\nTarget context: {target_context}\nPairs:\n{listed}");

        let request = ChatRequest::new(vec![ChatMessage::system(system), ChatMessage::user(user)]).with_json_mode(true);

        let response = match self.llm.chat(request).await {
            Ok(r) if r.error.is_none() => r,
            _ => return vec![QualityVerdict { is_valid: false, quality_score: 0.0 }; pairs.len()],
        };

        let value = response.parsed_json();
        let Some(verdicts) = value["verdicts"].as_array() else {
            return vec![QualityVerdict { is_valid: false, quality_score: 0.0 }; pairs.len()];
        };

        (0..pairs.len())
            .map(|i| {
                verdicts.get(i).map_or(QualityVerdict { is_valid: false, quality_score: 0.0 }, |raw| QualityVerdict {
                    is_valid: raw["is_valid"].as_bool().unwrap_or(false),
                    quality_score: raw["quality_score"].as_f64().unwrap_or(0.0).clamp(0.0, 1.0),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hte_llm::StubLlmClient;

    #[tokio::test]
    async fn check_batch_parses_per_pair_verdicts_in_order() {
        let stub = StubLlmClient::new().enqueue_json(serde_json::json!({
            "verdicts": [{"is_valid": true, "quality_score": 0.8}, {"is_valid": false, "quality_score": 0.1}]
        }));
        let agent = QualityCheckAgent::new(Arc::new(stub));

        let verdicts = agent.check_batch(&[("合同".to_string(), "contract".to_string()), ("bad".to_string(), "pair".to_string())], "ctx", "ctx").await;
        assert!(verdicts[0].is_valid);
        assert!(!verdicts[1].is_valid);
    }

    #[tokio::test]
    async fn check_batch_degrades_to_all_invalid_on_error() {
        let stub = StubLlmClient::new().enqueue(hte_llm::ChatResponse::error("boom"));
        let agent = QualityCheckAgent::new(Arc::new(stub));

        let verdicts = agent.check_batch(&[("a".to_string(), "b".to_string())], "ctx", "ctx").await;
        assert!(!verdicts[0].is_valid);
    }
}
