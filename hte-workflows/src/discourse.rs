use hte_agents::{CandidateSelector, DiscourseEvaluateAgent, DiscourseQueryAgent, DiscourseRefineAgent, Layer, TranslationControlConfig};
use hte_tm::{TmIndex, TmMatch};
use serde::Serialize;
use std::sync::Arc;

const TOP_K_REFERENCES: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct DiscourseResult {
    pub output_text: String,
    pub gated: bool,
    pub references: Vec<TmMatch>,
    pub candidates: Vec<String>,
    pub selected_index: usize,
    pub selector_reason: String,
}

/// R3: `[TMQuery] -> [DiscourseEvaluate] -> [gate] -> [filter refs] -> DiscourseRefine -> [select]`.
pub struct DiscourseWorkflow {
    tm_index: Option<Arc<TmIndex>>,
    query: DiscourseQueryAgent,
    evaluate: DiscourseEvaluateAgent,
    refine: DiscourseRefineAgent,
    selector: CandidateSelector,
}

impl DiscourseWorkflow {
    #[must_use]
    pub fn new(
        tm_index: Option<Arc<TmIndex>>,
        query: DiscourseQueryAgent,
        evaluate: DiscourseEvaluateAgent,
        refine: DiscourseRefineAgent,
        selector: CandidateSelector,
    ) -> Self {
        Self { tm_index, query, evaluate, refine, selector }
    }

    pub async fn run(&self, source_text: &str, r2_translation: &str, src_lang: &str, tgt_lang: &str, use_tm: bool, control: &TranslationControlConfig) -> DiscourseResult {
        let references = if use_tm {
            if let Some(tm_index) = &self.tm_index {
                let built_query = self.query.build_query(source_text, r2_translation, None).await;
                tm_index
                    .hybrid_search(&built_query.reference_query, None, Some(src_lang), Some(tgt_lang), TOP_K_REFERENCES, 0.5, 0.5)
                    .await
                    .unwrap_or_default()
            } else {
                Vec::new()
            }
        } else {
            Vec::new()
        };

        if references.is_empty() {
            return DiscourseResult {
                output_text: r2_translation.to_string(),
                gated: false,
                references,
                candidates: Vec::new(),
                selected_index: 0,
                selector_reason: String::new(),
            };
        }

        let ref_texts: Vec<String> = references.iter().map(|r| r.target_text.clone()).collect();
        let evaluation = self.evaluate.evaluate(source_text, r2_translation, &ref_texts).await;

        if control.gating_enabled_for(Layer::Discourse) && evaluation.overall_score >= control.discourse_threshold {
            return DiscourseResult {
                output_text: r2_translation.to_string(),
                gated: true,
                references,
                candidates: Vec::new(),
                selected_index: 0,
                selector_reason: String::new(),
            };
        }

        let filtered_refs: Vec<String> = if control.gating_enabled_for(Layer::Discourse) {
            references.iter().filter(|r| r.similarity_score >= control.tm_similarity_threshold).map(|r| r.target_text.clone()).collect()
        } else {
            ref_texts
        };

        let num_candidates = if control.selection_enabled_for(Layer::Discourse) { control.num_candidates } else { 1 };
        let candidates = self.refine.refine_candidates(source_text, r2_translation, &filtered_refs, num_candidates).await;

        if candidates.len() <= 1 {
            return DiscourseResult {
                output_text: candidates.into_iter().next().unwrap_or_else(|| r2_translation.to_string()),
                gated: false,
                references,
                candidates: Vec::new(),
                selected_index: 0,
                selector_reason: String::new(),
            };
        }

        let selection = self.selector.select(source_text, &candidates).await;
        DiscourseResult {
            output_text: candidates[selection.selected_index].clone(),
            gated: false,
            references,
            candidates,
            selected_index: selection.selected_index,
            selector_reason: selection.reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hte_agents::ControlConfigPresets;
    use hte_llm::StubLlmClient;
    use hte_tm::TmEntry;

    fn stub(responses: Vec<serde_json::Value>) -> Arc<StubLlmClient> {
        let mut client = StubLlmClient::new();
        for r in responses {
            client = client.enqueue_json(r);
        }
        Arc::new(client)
    }

    async fn seeded_tm() -> Arc<TmIndex> {
        let index = TmIndex::new(None);
        index
            .batch_add_entries(vec![TmEntry::new("合同双方应当遵守协议", "the parties shall comply with the agreement", "zh", "en")], 10)
            .await
            .unwrap();
        Arc::new(index)
    }

    #[tokio::test]
    async fn skips_rewrite_when_no_references_found() {
        let llm: Arc<dyn hte_llm::LlmClient> = stub(vec![serde_json::json!({"reference_query": "no match at all"})]);
        let workflow = DiscourseWorkflow::new(
            Some(Arc::new(TmIndex::new(None))),
            DiscourseQueryAgent::new(llm.clone()),
            DiscourseEvaluateAgent::new(llm.clone()),
            DiscourseRefineAgent::new(llm.clone()),
            CandidateSelector::new(llm),
        );

        let control = ControlConfigPresets::disabled();
        let result = workflow.run("source", "r2 translation", "zh", "en", true, &control).await;
        assert_eq!(result.output_text, "r2 translation");
        assert!(result.references.is_empty());
    }

    #[tokio::test]
    async fn gates_when_references_exist_and_score_meets_threshold() {
        let llm: Arc<dyn hte_llm::LlmClient> = stub(vec![
            serde_json::json!({"reference_query": "合同双方应当遵守协议"}),
            serde_json::json!({"overall_score": 0.95, "coherence_score": 0.95, "issues": []}),
        ]);
        let workflow = DiscourseWorkflow::new(
            Some(seeded_tm().await),
            DiscourseQueryAgent::new(llm.clone()),
            DiscourseEvaluateAgent::new(llm.clone()),
            DiscourseRefineAgent::new(llm.clone()),
            CandidateSelector::new(llm),
        );

        let control = ControlConfigPresets::gating_only_balanced();
        let result = workflow.run("合同双方应当遵守协议", "the parties shall comply", "zh", "en", true, &control).await;
        assert!(result.gated);
        assert_eq!(result.output_text, "the parties shall comply");
    }
}
