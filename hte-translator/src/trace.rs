use hte_workflows::{DiscourseResult, SyntaxResult, TerminologyResult};
use serde::Serialize;

/// Per-sample HTE result: records every round's inputs, decisions, and
/// final text, so experiments can inspect exactly what happened without
/// re-running the pipeline.
#[derive(Debug, Clone, Serialize, Default)]
pub struct Trace {
    pub r1: Option<TerminologyResult>,
    pub r2: Option<SyntaxResult>,
    pub r3: Option<DiscourseResult>,
    pub baseline: Option<String>,
}

impl Trace {
    /// The text a downstream round (or the final output, if no further
    /// round ran) should treat as "the current translation".
    #[must_use]
    pub fn final_text(&self) -> String {
        if let Some(r3) = &self.r3 {
            return r3.output_text.clone();
        }
        if let Some(r2) = &self.r2 {
            return r2.output_text.clone();
        }
        if let Some(r1) = &self.r1 {
            return r1.output_text.clone();
        }
        self.baseline.clone().unwrap_or_default()
    }
}
