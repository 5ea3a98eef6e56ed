use std::collections::HashSet;

/// The three cascaded control layers that the gating and candidate
/// selection policies can independently be enabled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Terminology,
    Syntax,
    Discourse,
}

/// Process-wide, immutable-after-startup control record for the two
/// orthogonal HTE controls: gating (input-level skip-if-good-enough) and
/// candidate selection (output-level LLM-judged pick-best). Constructed
/// once in the startup routine and shared via `Arc`, never mutated at
/// runtime (§9 "from global singletons to explicit lifecycle").
#[derive(Debug, Clone)]
pub struct TranslationControlConfig {
    pub selection_enabled_layers: HashSet<Layer>,
    pub gating_enabled_layers: HashSet<Layer>,
    pub num_candidates: usize,
    pub terminology_threshold: f64,
    pub syntax_threshold: f64,
    pub discourse_threshold: f64,
    pub tm_similarity_threshold: f64,
}

impl Default for TranslationControlConfig {
    fn default() -> Self {
        Self {
            selection_enabled_layers: HashSet::new(),
            gating_enabled_layers: HashSet::new(),
            num_candidates: 1,
            terminology_threshold: 0.7,
            syntax_threshold: 0.85,
            discourse_threshold: 0.85,
            tm_similarity_threshold: 0.5,
        }
    }
}

impl TranslationControlConfig {
    #[must_use]
    pub fn selection_enabled_for(&self, layer: Layer) -> bool {
        self.selection_enabled_layers.contains(&layer)
    }

    #[must_use]
    pub fn gating_enabled_for(&self, layer: Layer) -> bool {
        self.gating_enabled_layers.contains(&layer)
    }

    #[must_use]
    pub fn should_apply_syntax_modification(&self, overall_score: f64) -> bool {
        overall_score < self.syntax_threshold
    }

    #[must_use]
    pub fn should_apply_discourse_modification(&self, overall_score: f64) -> bool {
        overall_score < self.discourse_threshold
    }
}

/// Named presets, mirroring the builder-style factory functions the
/// reference kit favors (e.g. `RetryConfig::disabled()`).
pub struct ControlConfigPresets;

impl ControlConfigPresets {
    #[must_use]
    pub fn disabled() -> TranslationControlConfig {
        TranslationControlConfig::default()
    }

    #[must_use]
    pub fn selection_only(num_candidates: usize) -> TranslationControlConfig {
        TranslationControlConfig {
            selection_enabled_layers: [Layer::Terminology, Layer::Syntax, Layer::Discourse].into_iter().collect(),
            num_candidates: num_candidates.max(1),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn gating_only_conservative() -> TranslationControlConfig {
        TranslationControlConfig {
            gating_enabled_layers: [Layer::Terminology, Layer::Syntax, Layer::Discourse].into_iter().collect(),
            terminology_threshold: 0.9,
            syntax_threshold: 0.95,
            discourse_threshold: 0.95,
            tm_similarity_threshold: 0.7,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn gating_only_aggressive() -> TranslationControlConfig {
        TranslationControlConfig {
            gating_enabled_layers: [Layer::Terminology, Layer::Syntax, Layer::Discourse].into_iter().collect(),
            terminology_threshold: 0.5,
            syntax_threshold: 0.7,
            discourse_threshold: 0.7,
            tm_similarity_threshold: 0.3,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn gating_only_balanced() -> TranslationControlConfig {
        TranslationControlConfig {
            gating_enabled_layers: [Layer::Terminology, Layer::Syntax, Layer::Discourse].into_iter().collect(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn full_control(num_candidates: usize) -> TranslationControlConfig {
        TranslationControlConfig {
            selection_enabled_layers: [Layer::Terminology, Layer::Syntax, Layer::Discourse].into_iter().collect(),
            gating_enabled_layers: [Layer::Terminology, Layer::Syntax, Layer::Discourse].into_iter().collect(),
            num_candidates: num_candidates.max(1),
            ..Default::default()
        }
    }
}
