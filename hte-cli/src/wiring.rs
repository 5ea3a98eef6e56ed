use hte_agents::{
    BaselineAgent, CandidateSelector, DiscourseEvaluateAgent, DiscourseQueryAgent, DiscourseRefineAgent, MonoExtractAgent, SearchAgent, SyntaxBiExtractAgent,
    SyntaxEvaluateAgent, SyntaxRefineAgent, TerminologyEvaluateAgent, TerminologyTranslateAgent,
};
use hte_llm::LlmClient;
use hte_termbase::Termbase;
use hte_tm::TmIndex;
use hte_translator::HierarchicalTranslator;
use hte_workflows::{DiscourseWorkflow, SyntaxWorkflow, TerminologyWorkflow};
use std::sync::Arc;

/// Assembles the full R1 -> R2 -> R3 workflow chain from a shared LLM
/// client and the two external stores, the same wiring the startup
/// routine performs once and never repeats per-request (§9 "explicit
/// lifecycle").
pub fn build_translator(llm: Arc<dyn LlmClient>, termbase: Arc<Termbase>, tm_index: Arc<TmIndex>) -> HierarchicalTranslator {
    let terminology = TerminologyWorkflow::new(
        MonoExtractAgent::new(Arc::clone(&llm)),
        Some(SearchAgent::new(Arc::clone(&termbase))),
        TerminologyEvaluateAgent::new(Arc::clone(&llm)),
        TerminologyTranslateAgent::new(Arc::clone(&llm)),
        BaselineAgent::new(Arc::clone(&llm)),
        CandidateSelector::new(Arc::clone(&llm)),
    );

    let syntax = SyntaxWorkflow::new(SyntaxBiExtractAgent::new(Arc::clone(&llm)), SyntaxEvaluateAgent::new(Arc::clone(&llm)), SyntaxRefineAgent::new(Arc::clone(&llm)), CandidateSelector::new(Arc::clone(&llm)));

    let discourse = DiscourseWorkflow::new(
        Some(Arc::clone(&tm_index)),
        DiscourseQueryAgent::new(Arc::clone(&llm)),
        DiscourseEvaluateAgent::new(Arc::clone(&llm)),
        DiscourseRefineAgent::new(Arc::clone(&llm)),
        CandidateSelector::new(Arc::clone(&llm)),
    );

    HierarchicalTranslator::new(terminology, syntax, discourse)
}
