//! Hierarchical Translator (C6): sequences the terminology, syntax, and
//! discourse rounds and captures a per-sample trace.

pub mod trace;
pub mod translator;

pub use trace::Trace;
pub use translator::{HierarchicalTranslator, TranslateRequest};

#[cfg(test)]
mod tests {
    use super::*;
    use hte_agents::{
        BaselineAgent, CandidateSelector, ControlConfigPresets, DiscourseEvaluateAgent, DiscourseQueryAgent, DiscourseRefineAgent, MonoExtractAgent,
        SearchAgent, SyntaxBiExtractAgent, SyntaxEvaluateAgent, SyntaxRefineAgent, TerminologyEvaluateAgent, TerminologyTranslateAgent,
    };
    use hte_llm::StubLlmClient;
    use hte_termbase::Termbase;
    use hte_tm::TmIndex;
    use hte_workflows::{DiscourseWorkflow, SyntaxWorkflow, TerminologyWorkflow};
    use std::sync::Arc;

    fn build_translator(llm: Arc<dyn hte_llm::LlmClient>) -> HierarchicalTranslator {
        let termbase = Arc::new(Termbase::open(":memory:").unwrap());
        let tm_index = Arc::new(TmIndex::new(None));

        let terminology = TerminologyWorkflow::new(
            MonoExtractAgent::new(llm.clone()),
            Some(SearchAgent::new(termbase)),
            TerminologyEvaluateAgent::new(llm.clone()),
            TerminologyTranslateAgent::new(llm.clone()),
            BaselineAgent::new(llm.clone()),
            CandidateSelector::new(llm.clone()),
        );
        let syntax = SyntaxWorkflow::new(
            SyntaxBiExtractAgent::new(llm.clone()),
            SyntaxEvaluateAgent::new(llm.clone()),
            SyntaxRefineAgent::new(llm.clone()),
            CandidateSelector::new(llm.clone()),
        );
        let discourse = DiscourseWorkflow::new(
            Some(tm_index),
            DiscourseQueryAgent::new(llm.clone()),
            DiscourseEvaluateAgent::new(llm.clone()),
            DiscourseRefineAgent::new(llm.clone()),
            CandidateSelector::new(llm),
        );

        HierarchicalTranslator::new(terminology, syntax, discourse)
    }

    #[tokio::test]
    async fn non_hierarchical_mode_runs_only_baseline() {
        let llm: Arc<dyn hte_llm::LlmClient> =
            Arc::new(StubLlmClient::new().with_default(hte_llm::ChatResponse { content: r#"{"translation": "baseline output"}"#.into(), finish_reason: "stop".into(), ..Default::default() }));
        let translator = build_translator(llm);

        let request = TranslateRequest {
            source_text: "合同应当有效".to_string(),
            src_lang: "zh".to_string(),
            tgt_lang: "en".to_string(),
            hierarchical: false,
            use_termbase: false,
            use_tm: false,
            max_rounds: 1,
        };

        let trace = translator.translate(&request, &ControlConfigPresets::disabled()).await;
        assert_eq!(trace.baseline.as_deref(), Some("baseline output"));
        assert!(trace.r1.is_none());
    }

    #[tokio::test]
    async fn max_rounds_one_stops_after_terminology() {
        let llm: Arc<dyn hte_llm::LlmClient> =
            Arc::new(StubLlmClient::new().with_default(hte_llm::ChatResponse { content: r#"{"translation": "r1 output", "terms": []}"#.into(), finish_reason: "stop".into(), ..Default::default() }));
        let translator = build_translator(llm);

        let request = TranslateRequest {
            source_text: "source".to_string(),
            src_lang: "zh".to_string(),
            tgt_lang: "en".to_string(),
            hierarchical: true,
            use_termbase: false,
            use_tm: false,
            max_rounds: 1,
        };

        let trace = translator.translate(&request, &ControlConfigPresets::disabled()).await;
        assert!(trace.r1.is_some());
        assert!(trace.r2.is_none());
        assert!(trace.r3.is_none());
    }

    #[tokio::test]
    async fn r1_source_text_is_recorded_for_downstream_rounds() {
        let llm: Arc<dyn hte_llm::LlmClient> = Arc::new(StubLlmClient::new().with_default(hte_llm::ChatResponse {
            content: r#"{"translation": "full pipeline output", "terms": [], "overall_score": 0.99, "structural_fidelity": 0.99, "coherence_score": 0.99, "reference_query": "no match", "patterns": [], "issues": []}"#.into(),
            finish_reason: "stop".into(),
            ..Default::default()
        }));
        let translator = build_translator(llm);

        let request = TranslateRequest {
            source_text: "合同双方应当遵守协议".to_string(),
            src_lang: "zh".to_string(),
            tgt_lang: "en".to_string(),
            hierarchical: true,
            use_termbase: false,
            use_tm: true,
            max_rounds: 3,
        };

        let trace = translator.translate(&request, &ControlConfigPresets::disabled()).await;
        assert_eq!(trace.r1.as_ref().unwrap().source_text, "合同双方应当遵守协议");
        assert!(trace.r3.is_some());
    }
}
