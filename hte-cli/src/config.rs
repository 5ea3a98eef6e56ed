use hte_agents::{Layer, TranslationControlConfig};
use hte_core::HteError;
use hte_llm::{LlmClient, LlmConfig, OpenAiClient};
use hte_termbase::Termbase;
use hte_tm::{MilvusConfig, MilvusHttpBackend, TmIndex};
use std::sync::Arc;

/// Builds the OpenAI-compatible chat client from environment configuration.
/// Any failure here (missing `OPENAI_API_KEY`, malformed numeric env vars)
/// is a startup `HteError::Config`, per the exit-code-1 contract.
pub fn build_llm_client() -> Result<Arc<dyn LlmClient>, HteError> {
    let config = LlmConfig::from_env()?;
    Ok(Arc::new(OpenAiClient::new(config)))
}

/// Opens the SQLite termbase at `TERMS_DB` (default `terms.db`).
pub fn build_termbase() -> Result<Termbase, HteError> {
    let path = std::env::var("TERMS_DB").unwrap_or_else(|_| "terms.db".to_string());
    Termbase::open(path)
}

/// Builds the hybrid TM index. Vector retrieval requires `EMBEDDING_DIM`
/// to be set; when it isn't, the index still works BM25-only, matching
/// the "Milvus unavailable disables vector retrieval but BM25 still
/// works" storage-error policy.
pub fn build_tm_index() -> TmIndex {
    let vector_backend = MilvusConfig::from_env().ok().map(|config| Arc::new(MilvusHttpBackend::new(config)) as Arc<dyn hte_tm::VectorBackend>);
    TmIndex::new(vector_backend)
}

/// Parses a comma-separated `--selection-layers`/`--gating-layers` flag
/// value (`"terminology,syntax"`) into the `Layer` set it names. Blank
/// input yields an empty set.
pub fn parse_layers(raw: &str) -> Result<std::collections::HashSet<Layer>, HteError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.to_lowercase().as_str() {
            "terminology" => Ok(Layer::Terminology),
            "syntax" => Ok(Layer::Syntax),
            "discourse" => Ok(Layer::Discourse),
            other => Err(HteError::Config(format!("unknown control layer: {other}"))),
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
pub fn build_control_config(
    selection_layers: std::collections::HashSet<Layer>,
    gating_layers: std::collections::HashSet<Layer>,
    num_candidates: usize,
    terminology_threshold: f64,
    syntax_threshold: f64,
    discourse_threshold: f64,
    tm_similarity_threshold: f64,
) -> TranslationControlConfig {
    TranslationControlConfig {
        selection_enabled_layers: selection_layers,
        gating_enabled_layers: gating_layers,
        num_candidates: num_candidates.max(1),
        terminology_threshold,
        syntax_threshold,
        discourse_threshold,
        tm_similarity_threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_layers_accepts_comma_separated_names() {
        let layers = parse_layers("terminology, discourse").unwrap();
        assert!(layers.contains(&Layer::Terminology));
        assert!(layers.contains(&Layer::Discourse));
        assert!(!layers.contains(&Layer::Syntax));
    }

    #[test]
    fn parse_layers_rejects_unknown_name() {
        assert!(parse_layers("terminology,bogus").is_err());
    }

    #[test]
    fn parse_layers_blank_input_is_empty_set() {
        assert!(parse_layers("").unwrap().is_empty());
    }
}
