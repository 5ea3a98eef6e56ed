//! Typed layer agents (C4) for the terminology, syntax, and discourse
//! rounds of the hierarchical translator, plus the shared control-config
//! record they're gated and selected against.

pub mod bi_extract;
pub mod bilingual_extract;
pub mod control_config;
pub mod discourse_evaluate;
pub mod discourse_query;
pub mod discourse_refine;
pub mod evaluate;
pub mod mono_extract;
pub mod quality_check;
pub mod search;
pub mod selector;
pub mod syntax_evaluate;
pub mod syntax_refine;
pub mod translate;

pub use bi_extract::{SyntaxBiExtractAgent, SyntaxPattern};
pub use bilingual_extract::{AttributedTerm, BilingualExtractAgent, ExtractedTermPair, TextPairEntry};
pub use control_config::{ControlConfigPresets, Layer, TranslationControlConfig};
pub use discourse_evaluate::{DiscourseEvaluateAgent, DiscourseEvaluation};
pub use discourse_query::{DiscourseQuery, DiscourseQueryAgent};
pub use discourse_refine::DiscourseRefineAgent;
pub use evaluate::{TerminologyEvaluateAgent, TerminologyEvaluation};
pub use mono_extract::{MonoExtractAgent, MonoTerm};
pub use quality_check::{QualityCheckAgent, QualityVerdict};
pub use search::SearchAgent;
pub use selector::{CandidateSelector, SelectionResult};
pub use syntax_evaluate::{SyntaxEvaluateAgent, SyntaxEvaluation};
pub use syntax_refine::SyntaxRefineAgent;
pub use translate::{BaselineAgent, TerminologyTranslateAgent};
