use hte_agents::{CandidateSelector, Layer, SyntaxBiExtractAgent, SyntaxEvaluateAgent, SyntaxRefineAgent, TranslationControlConfig};
use serde::Serialize;

const PATTERN_CONFIDENCE_THRESHOLD: f64 = 0.9;
const DIMENSION_SCORE_THRESHOLD: f64 = 0.9;

#[derive(Debug, Clone, Serialize)]
pub struct SyntaxResult {
    pub output_text: String,
    pub gated: bool,
    pub candidates: Vec<String>,
    pub selected_index: usize,
    pub selector_reason: String,
}

/// R2: `BiExtract -> SyntaxEvaluate -> [gate] -> SyntaxRefine -> [select]`.
pub struct SyntaxWorkflow {
    bi_extract: SyntaxBiExtractAgent,
    evaluate: SyntaxEvaluateAgent,
    refine: SyntaxRefineAgent,
    selector: CandidateSelector,
}

impl SyntaxWorkflow {
    #[must_use]
    pub fn new(bi_extract: SyntaxBiExtractAgent, evaluate: SyntaxEvaluateAgent, refine: SyntaxRefineAgent, selector: CandidateSelector) -> Self {
        Self { bi_extract, evaluate, refine, selector }
    }

    pub async fn run(&self, source_text: &str, r1_translation: &str, protected_terms: &[String], control: &TranslationControlConfig) -> SyntaxResult {
        let patterns = self.bi_extract.extract(source_text, r1_translation).await;
        let evaluation = self.evaluate.evaluate(source_text, r1_translation).await;

        let has_low_confidence_pattern = patterns.iter().any(|p| p.confidence < PATTERN_CONFIDENCE_THRESHOLD);
        let has_low_score_dimension = evaluation.overall_score < DIMENSION_SCORE_THRESHOLD || evaluation.structural_fidelity < DIMENSION_SCORE_THRESHOLD;

        if control.gating_enabled_for(Layer::Syntax) && !has_low_confidence_pattern && !has_low_score_dimension && evaluation.overall_score >= control.syntax_threshold {
            return SyntaxResult {
                output_text: r1_translation.to_string(),
                gated: true,
                candidates: Vec::new(),
                selected_index: 0,
                selector_reason: String::new(),
            };
        }

        if !control.selection_enabled_for(Layer::Syntax) {
            let refined = self.refine.refine(source_text, r1_translation, &patterns, protected_terms).await;
            return SyntaxResult { output_text: refined, gated: false, candidates: Vec::new(), selected_index: 0, selector_reason: String::new() };
        }

        let mut candidates = vec![r1_translation.to_string()];
        for _ in 0..control.num_candidates.max(1).saturating_sub(1) {
            candidates.push(self.refine.refine(source_text, r1_translation, &patterns, protected_terms).await);
        }

        let selection = self.selector.select(source_text, &candidates).await;
        SyntaxResult {
            output_text: candidates[selection.selected_index].clone(),
            gated: false,
            candidates,
            selected_index: selection.selected_index,
            selector_reason: selection.reason,
        }
    }
}
