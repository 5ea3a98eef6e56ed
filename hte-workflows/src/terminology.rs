use hte_agents::{
    BaselineAgent, CandidateSelector, Layer, MonoExtractAgent, SearchAgent, TerminologyEvaluateAgent, TerminologyTranslateAgent, TranslationControlConfig,
};
use hte_termbase::Term;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct TerminologyResult {
    pub source_text: String,
    pub output_text: String,
    pub term_table: Vec<Term>,
    pub gated: bool,
    pub candidates: Vec<String>,
    pub selected_index: usize,
    pub selector_reason: String,
}

/// R1: `MonoExtract -> Search(termbase) -> Evaluate -> [gate] -> Translate`.
/// In non-hierarchical mode, runs only the zero-glossary Baseline agent and
/// skips every other step (spec §4.5.1 step 5's baseline shortcut).
pub struct TerminologyWorkflow {
    mono_extract: MonoExtractAgent,
    search: Option<SearchAgent>,
    evaluate: TerminologyEvaluateAgent,
    translate: TerminologyTranslateAgent,
    baseline: BaselineAgent,
    selector: CandidateSelector,
}

impl TerminologyWorkflow {
    #[must_use]
    pub fn new(
        mono_extract: MonoExtractAgent,
        search: Option<SearchAgent>,
        evaluate: TerminologyEvaluateAgent,
        translate: TerminologyTranslateAgent,
        baseline: BaselineAgent,
        selector: CandidateSelector,
    ) -> Self {
        Self { mono_extract, search, evaluate, translate, baseline, selector }
    }

    pub async fn run_baseline(&self, source_text: &str, src_lang: &str, tgt_lang: &str) -> TerminologyResult {
        let output = self.baseline.translate(source_text, src_lang, tgt_lang).await.unwrap_or_default();
        TerminologyResult {
            source_text: source_text.to_string(),
            output_text: output,
            term_table: Vec::new(),
            gated: false,
            candidates: Vec::new(),
            selected_index: 0,
            selector_reason: String::new(),
        }
    }

    pub async fn run(&self, source_text: &str, src_lang: &str, tgt_lang: &str, use_termbase: bool, control: &TranslationControlConfig) -> TerminologyResult {
        let mono_terms = self.mono_extract.extract(source_text).await;

        let mut term_table = Vec::new();
        if use_termbase {
            if let Some(search) = &self.search {
                let term_strings: Vec<String> = mono_terms.iter().map(|t| t.term.clone()).collect();
                term_table = search.search_batch(&term_strings, src_lang, tgt_lang, None).await;
            }
        }

        let glossary_strings: Vec<String> = term_table.iter().map(|t| t.source_term.clone()).collect();
        let evaluation = self.evaluate.evaluate(source_text, source_text, &glossary_strings).await;

        if control.gating_enabled_for(Layer::Terminology) {
            term_table.retain(|_| evaluation.contextual_fit >= control.terminology_threshold);
        }

        let num_candidates = if control.selection_enabled_for(Layer::Terminology) { control.num_candidates } else { 1 };
        let candidates = self.translate.translate(source_text, src_lang, tgt_lang, &term_table, num_candidates).await;

        if candidates.is_empty() {
            return TerminologyResult {
                source_text: source_text.to_string(),
                output_text: String::new(),
                term_table,
                gated: false,
                candidates: Vec::new(),
                selected_index: 0,
                selector_reason: "no candidate produced".to_string(),
            };
        }

        let selection = self.selector.select(source_text, &candidates).await;

        TerminologyResult {
            source_text: source_text.to_string(),
            output_text: candidates[selection.selected_index].clone(),
            term_table,
            gated: false,
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
    use hte_llm::{ChatResponse, StubLlmClient};
    use hte_termbase::Termbase;

    fn stub(responses: Vec<serde_json::Value>) -> Arc<StubLlmClient> {
        let mut client = StubLlmClient::new();
        for r in responses {
            client = client.enqueue_json(r);
        }
        Arc::new(client)
    }

    #[tokio::test]
    async fn run_produces_a_single_candidate_when_selection_disabled() {
        let llm: Arc<dyn hte_llm::LlmClient> = stub(vec![
            serde_json::json!({"terms": [{"term": "合同", "score": 0.9, "category": "noun"}]}),
            serde_json::json!({"overall_score": 0.8, "contextual_fit": 0.8, "issues": []}),
            serde_json::json!({"translation": "the contract shall be valid"}),
        ]);
        let termbase = Arc::new(Termbase::open(":memory:").unwrap());
        let workflow = TerminologyWorkflow::new(
            MonoExtractAgent::new(llm.clone()),
            Some(SearchAgent::new(termbase)),
            TerminologyEvaluateAgent::new(llm.clone()),
            TerminologyTranslateAgent::new(llm.clone()),
            BaselineAgent::new(llm.clone()),
            CandidateSelector::new(llm),
        );

        let result = workflow.run("合同应当有效", "zh", "en", true, &ControlConfigPresets::disabled()).await;
        assert_eq!(result.candidates.len(), 1);
        assert_eq!(result.output_text, "the contract shall be valid");
    }

    #[tokio::test]
    async fn run_baseline_skips_extraction_and_glossary_entirely() {
        let llm = Arc::new(StubLlmClient::new().enqueue(ChatResponse {
            content: r#"{"translation": "plain translation"}"#.into(),
            finish_reason: "stop".into(),
            ..Default::default()
        }));
        let workflow = TerminologyWorkflow::new(
            MonoExtractAgent::new(llm.clone()),
            None,
            TerminologyEvaluateAgent::new(llm.clone()),
            TerminologyTranslateAgent::new(llm.clone()),
            BaselineAgent::new(llm.clone()),
            CandidateSelector::new(llm),
        );

        let result = workflow.run_baseline("source", "zh", "en").await;
        assert_eq!(result.output_text, "plain translation");
        assert!(result.term_table.is_empty());
    }
}
