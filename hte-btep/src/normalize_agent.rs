use hte_llm::{ChatMessage, ChatRequest, LlmClient};
use std::sync::Arc;

/// Normalizes a batch of surface forms on one side (source or target) of a
/// term pair, in the teacher's narrow-LLM-wrapper style. Callers run this
/// once per side per chunk and validate the result against the language
/// rule before accepting it.
pub struct NormalizeAgent {
    llm: Arc<dyn LlmClient>,
}

impl NormalizeAgent {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn normalize_batch(&self, terms: &[String], language: &str, instructions: &str) -> Vec<String> {
        if terms.is_empty() {
            return Vec::new();
        }

        let system = format!(
            "You normalize legal terminology surface forms in {language}. {instructions} \
             Respond with JSON: {{\"normalized\": [str]}} with one entry per input term, in order."
        );
        let user = terms.iter().enumerate().map(|(i, t)| format!("[{i}] {t}")).collect::<Vec<_>>().join("\n");

        let request = ChatRequest::new(vec![ChatMessage::system(system), ChatMessage::user(user)]).with_json_mode(true);

        let response = match self.llm.chat(request).await {
            Ok(r) if r.error.is_none() => r,
            _ => return terms.to_vec(),
        };

        let value = response.parsed_json();
        let Some(normalized) = value["normalized"].as_array() else { return terms.to_vec() };

        (0..terms.len()).map(|i| normalized.get(i).and_then(|v| v.as_str()).map(String::from).unwrap_or_else(|| terms[i].clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hte_llm::StubLlmClient;

    #[tokio::test]
    async fn normalize_batch_falls_back_to_original_on_missing_entries() {
        let stub = StubLlmClient::new().enqueue_json(serde_json::json!({ "normalized": ["合同"] }));
        let agent = NormalizeAgent::new(Arc::new(stub));

        let result = agent.normalize_batch(&["合同".to_string(), "协议书".to_string()], "Chinese", "simplify traditional characters").await;
        assert_eq!(result[0], "合同");
        assert_eq!(result[1], "协议书");
    }
}
