use crate::bi_extract::SyntaxPattern;
use hte_llm::{ChatMessage, ChatRequest, LlmClient};
use std::sync::Arc;

/// Rewrites a draft translation to fix flagged syntax/modality issues,
/// while protecting two invariants a refinement pass must never violate:
/// it must not drop a glossary term the current draft already contains,
/// and it must not collapse the translation to a fragment. Either
/// violation falls back to the unmodified current translation.
pub struct SyntaxRefineAgent {
    llm: Arc<dyn LlmClient>,
}

impl SyntaxRefineAgent {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn refine(&self, source_text: &str, current_translation: &str, patterns: &[SyntaxPattern], protected_terms: &[String]) -> String {
        let pattern_text = patterns
            .iter()
            .map(|p| format!("{} -> {} ({})", p.source_pattern, p.target_pattern, p.modality_type))
            .collect::<Vec<_>>()
            .join("; ");

        let system = format!(
            "You refine a legal translation's syntax and modality to match the source, without changing \
             any glossary terms already present. Known patterns: {pattern_text}. Respond with JSON: {{\"translation\": str}}."
        );
        let user = format!("Source: {source_text}\nCurrent translation: {current_translation}");

        let request = ChatRequest::new(vec![ChatMessage::system(system), ChatMessage::user(user)]).with_json_mode(true);

        let refined = match self.llm.chat(request).await {
            Ok(r) if r.error.is_none() => r.parsed_json()["translation"].as_str().map(String::from),
            _ => None,
        };

        let Some(refined) = refined else { return current_translation.to_string() };

        if !preserves_protected_terms(current_translation, &refined, protected_terms) {
            return current_translation.to_string();
        }
        if collapses_length(current_translation, &refined) {
            return current_translation.to_string();
        }
        refined
    }
}

/// A protected term that was present in the current draft must still be
/// present in the refined one.
fn preserves_protected_terms(current: &str, refined: &str, protected_terms: &[String]) -> bool {
    protected_terms.iter().filter(|t| current.contains(t.as_str())).all(|t| refined.contains(t.as_str()))
}

/// Rejects a refinement that shrinks the translation below half its
/// current character length, a cheap guard against truncated rewrites.
fn collapses_length(current: &str, refined: &str) -> bool {
    if current.is_empty() {
        return false;
    }
    (refined.chars().count() as f64) < 0.5 * (current.chars().count() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hte_llm::StubLlmClient;

    #[tokio::test]
    async fn refine_accepts_well_formed_response_preserving_terms() {
        let stub = StubLlmClient::new().enqueue_json(serde_json::json!({
            "translation": "the parties shall fully comply with the contract and its agreement"
        }));
        let agent = SyntaxRefineAgent::new(Arc::new(stub));

        let result = agent
            .refine(
                "合同双方应当遵守协议",
                "the parties shall comply with the contract",
                &[],
                &["contract".to_string()],
            )
            .await;
        assert!(result.contains("contract"));
    }

    #[tokio::test]
    async fn refine_falls_back_when_protected_term_dropped() {
        let stub = StubLlmClient::new().enqueue_json(serde_json::json!({
            "translation": "the parties shall comply"
        }));
        let agent = SyntaxRefineAgent::new(Arc::new(stub));

        let current = "the parties shall comply with the contract";
        let result = agent.refine("x", current, &[], &["contract".to_string()]).await;
        assert_eq!(result, current);
    }

    #[tokio::test]
    async fn refine_falls_back_when_refined_text_collapses_in_length() {
        let stub = StubLlmClient::new().enqueue_json(serde_json::json!({ "translation": "ok" }));
        let agent = SyntaxRefineAgent::new(Arc::new(stub));

        let current = "the parties shall comply with the contract and all its terms in good faith";
        let result = agent.refine("x", current, &[], &[]).await;
        assert_eq!(result, current);
    }
}
