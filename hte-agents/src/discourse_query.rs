use hte_llm::{ChatMessage, ChatRequest, LlmClient};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DiscourseQuery {
    pub reference_query: String,
    pub topics: Vec<String>,
}

/// Formulates a translation-memory query capturing the discourse-level
/// context (topic, register, cross-sentence reference) a single-sentence
/// draft doesn't carry on its own.
pub struct DiscourseQueryAgent {
    llm: Arc<dyn LlmClient>,
}

impl DiscourseQueryAgent {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn build_query(&self, source_text: &str, translation: &str, preceding_context: Option<&str>) -> DiscourseQuery {
        let system = "You formulate a translation-memory search query capturing the discourse context of a \
            legal sentence. Respond with JSON: {\"reference_query\": str, \"topics\": [str]}.";
        let user = match preceding_context {
            Some(ctx) => format!("Preceding context: {ctx}\nSource: {source_text}\nTranslation: {translation}"),
            None => format!("Source: {source_text}\nTranslation: {translation}"),
        };

        let request = ChatRequest::new(vec![ChatMessage::system(system), ChatMessage::user(user)]).with_json_mode(true);

        let response = match self.llm.chat(request).await {
            Ok(r) if r.error.is_none() => r,
            _ => return DiscourseQuery::default(),
        };

        let value = response.parsed_json();
        DiscourseQuery {
            reference_query: value["reference_query"].as_str().unwrap_or(source_text).to_string(),
            topics: value["topics"]
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
    async fn build_query_parses_well_formed_response() {
        let stub = StubLlmClient::new().enqueue_json(serde_json::json!({
            "reference_query": "contract liability clause", "topics": ["liability"]
        }));
        let agent = DiscourseQueryAgent::new(Arc::new(stub));

        let query = agent.build_query("合同双方应当承担责任", "the parties shall bear liability", None).await;
        assert_eq!(query.reference_query, "contract liability clause");
    }

    #[tokio::test]
    async fn build_query_falls_back_to_source_text_on_missing_field() {
        let stub = StubLlmClient::new().enqueue_json(serde_json::json!({ "topics": [] }));
        let agent = DiscourseQueryAgent::new(Arc::new(stub));

        let query = agent.build_query("source sentence", "translation", None).await;
        assert_eq!(query.reference_query, "source sentence");
    }
}
