use hte_agents::TranslationControlConfig;

/// One named experiment configuration: whether the pipeline runs
/// hierarchically at all, which external stores it consults, how many
/// rounds to run, and the control-layer settings to use for those rounds.
#[derive(Debug, Clone)]
pub struct AblationConfig {
    pub name: String,
    pub hierarchical: bool,
    pub use_termbase: bool,
    pub use_tm: bool,
    pub max_rounds: u8,
    pub control: TranslationControlConfig,
}

impl AblationConfig {
    #[must_use]
    pub fn baseline() -> Self {
        Self {
            name: "baseline".to_string(),
            hierarchical: false,
            use_termbase: false,
            use_tm: false,
            max_rounds: 1,
            control: TranslationControlConfig::default(),
        }
    }

    #[must_use]
    pub fn full(control: TranslationControlConfig) -> Self {
        Self { name: "full".to_string(), hierarchical: true, use_termbase: true, use_tm: true, max_rounds: 3, control }
    }
}
