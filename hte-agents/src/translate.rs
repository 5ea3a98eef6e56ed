use hte_llm::{ChatMessage, ChatRequest, LlmClient};
use hte_termbase::Term;
use std::sync::Arc;

/// Produces one or more draft translations with the matched glossary terms
/// enforced as mandatory substitutions. This is the only translate agent
/// that ever sees glossary terms — `BaselineAgent` never does.
pub struct TerminologyTranslateAgent {
    llm: Arc<dyn LlmClient>,
}

impl TerminologyTranslateAgent {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Generates `num_candidates` independent drafts (min 1) enforcing the
    /// matched glossary; a draft is dropped only if the LLM call itself
    /// fails, never resized to backfill a target count.
    pub async fn translate(&self, source_text: &str, src_lang: &str, tgt_lang: &str, glossary: &[Term], num_candidates: usize) -> Vec<String> {
        let glossary_text = glossary
            .iter()
            .map(|t| format!("{} -> {}", t.source_term, t.target_term))
            .collect::<Vec<_>>()
            .join("; ");

        let system = format!(
            "You translate legal text from {src_lang} to {tgt_lang}. You MUST use the following glossary \
             mappings wherever their source term appears: {glossary_text}. Respond with JSON: {{\"translation\": str}}."
        );

        let mut out = Vec::with_capacity(num_candidates.max(1));
        for _ in 0..num_candidates.max(1) {
            let request = ChatRequest::new(vec![ChatMessage::system(system.clone()), ChatMessage::user(source_text.to_string())])
                .with_json_mode(true)
                .with_temperature(0.7);

            let Ok(response) = self.llm.chat(request).await else { continue };
            if response.error.is_some() {
                continue;
            }
            let value = response.parsed_json();
            if let Some(translation) = value["translation"].as_str() {
                out.push(translation.to_string());
            }
        }
        out
    }
}

/// Translates with no glossary or control-layer awareness at all — the
/// non-hierarchical reference point experiments compare against.
pub struct BaselineAgent {
    llm: Arc<dyn LlmClient>,
}

impl BaselineAgent {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn translate(&self, source_text: &str, src_lang: &str, tgt_lang: &str) -> Option<String> {
        let system = format!("You translate legal text from {src_lang} to {tgt_lang}. Respond with JSON: {{\"translation\": str}}.");
        let request = ChatRequest::new(vec![ChatMessage::system(system), ChatMessage::user(source_text.to_string())]).with_json_mode(true);

        let response = self.llm.chat(request).await.ok()?;
        if response.error.is_some() {
            return None;
        }
        response.parsed_json()["translation"].as_str().map(String::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hte_llm::StubLlmClient;

    #[tokio::test]
    async fn translate_enforces_num_candidates_minimum_of_one() {
        let stub = StubLlmClient::new().with_default(hte_llm::ChatResponse {
            content: r#"{"translation": "the contract shall be valid"}"#.into(),
            ..Default::default()
        });
        let agent = TerminologyTranslateAgent::new(Arc::new(stub));

        let drafts = agent.translate("合同应当有效", "zh", "en", &[], 0).await;
        assert_eq!(drafts.len(), 1);
    }

    #[tokio::test]
    async fn translate_drops_failed_candidates_without_backfilling() {
        let stub = StubLlmClient::new()
            .enqueue_json(serde_json::json!({"translation": "ok"}))
            .enqueue(hte_llm::ChatResponse::error("boom"));
        let agent = TerminologyTranslateAgent::new(Arc::new(stub));

        let drafts = agent.translate("x", "zh", "en", &[], 2).await;
        assert_eq!(drafts, vec!["ok".to_string()]);
    }

    #[tokio::test]
    async fn baseline_agent_returns_none_on_error() {
        let stub = StubLlmClient::new().enqueue(hte_llm::ChatResponse::error("boom"));
        let agent = BaselineAgent::new(Arc::new(stub));
        assert!(agent.translate("x", "zh", "en").await.is_none());
    }
}
