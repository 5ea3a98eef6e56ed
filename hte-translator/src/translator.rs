use crate::trace::Trace;
use hte_agents::TranslationControlConfig;
use hte_workflows::{DiscourseWorkflow, SyntaxWorkflow, TerminologyWorkflow};

/// Request parameters for one translation, set per-experiment rather than
/// baked into the translator so the same instance can serve every
/// ablation in a run.
#[derive(Debug, Clone)]
pub struct TranslateRequest {
    pub source_text: String,
    pub src_lang: String,
    pub tgt_lang: String,
    pub hierarchical: bool,
    pub use_termbase: bool,
    pub use_tm: bool,
    pub max_rounds: u8,
}

/// Runs R1 unconditionally, R2 if `max_rounds >= 2`, R3 if `max_rounds >= 3`.
/// Non-hierarchical mode runs only the Baseline agent and records its
/// output under `trace.baseline`, skipping every round.
pub struct HierarchicalTranslator {
    terminology: TerminologyWorkflow,
    syntax: SyntaxWorkflow,
    discourse: DiscourseWorkflow,
}

impl HierarchicalTranslator {
    #[must_use]
    pub fn new(terminology: TerminologyWorkflow, syntax: SyntaxWorkflow, discourse: DiscourseWorkflow) -> Self {
        Self { terminology, syntax, discourse }
    }

    pub async fn translate(&self, request: &TranslateRequest, control: &TranslationControlConfig) -> Trace {
        if !request.hierarchical {
            let r1 = self.terminology.run_baseline(&request.source_text, &request.src_lang, &request.tgt_lang).await;
            return Trace { baseline: Some(r1.output_text), ..Default::default() };
        }

        let r1 = self
            .terminology
            .run(&request.source_text, &request.src_lang, &request.tgt_lang, request.use_termbase, control)
            .await;
        let mut trace = Trace { r1: Some(r1), ..Default::default() };

        if request.max_rounds < 2 {
            return trace;
        }

        let protected_terms: Vec<String> = trace.r1.as_ref().unwrap().term_table.iter().map(|t| t.target_term.clone()).collect();
        let r2 = self.syntax.run(&request.source_text, &trace.final_text(), &protected_terms, control).await;
        trace.r2 = Some(r2);

        if request.max_rounds < 3 {
            return trace;
        }

        let r3 = self
            .discourse
            .run(&request.source_text, &trace.final_text(), &request.src_lang, &request.tgt_lang, request.use_tm, control)
            .await;
        trace.r3 = Some(r3);
        trace
    }
}
