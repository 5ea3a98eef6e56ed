use hte_llm::{ChatMessage, ChatRequest, LlmClient};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminologyEvaluation {
    pub overall_score: f64,
    pub contextual_fit: f64,
    pub issues: Vec<String>,
}

impl Default for TerminologyEvaluation {
    fn default() -> Self {
        Self { overall_score: 0.0, contextual_fit: 0.0, issues: Vec::new() }
    }
}

/// Scores how well a draft translation uses the matched glossary terms in
/// context, feeding the terminology-layer gating decision.
pub struct TerminologyEvaluateAgent {
    llm: Arc<dyn LlmClient>,
}

impl TerminologyEvaluateAgent {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn evaluate(&self, source_text: &str, translation: &str, glossary_terms: &[String]) -> TerminologyEvaluation {
        let system = "You evaluate terminology fidelity of a legal translation against a glossary. \
            Respond with JSON: {\"overall_score\": 0..1, \"contextual_fit\": 0..1, \"issues\": [str]}.";
        let user = format!(
            "Source: {source_text}\nTranslation: {translation}\nGlossary terms: {}",
            glossary_terms.join(", ")
        );

        let request = ChatRequest::new(vec![ChatMessage::system(system), ChatMessage::user(user)]).with_json_mode(true);

        let response = match self.llm.chat(request).await {
            Ok(r) if r.error.is_none() => r,
            _ => return TerminologyEvaluation::default(),
        };

        let value = response.parsed_json();
        TerminologyEvaluation {
            overall_score: value["overall_score"].as_f64().unwrap_or(0.0).clamp(0.0, 1.0),
            contextual_fit: value["contextual_fit"].as_f64().unwrap_or(0.0).clamp(0.0, 1.0),
            issues: value["issues"]
                .as_array()
                .map(|a| a.iter().filter_map(|v| v.as_str().map(String::from)).collect())
                .unwrap_or_default(),
        }
    }
}
