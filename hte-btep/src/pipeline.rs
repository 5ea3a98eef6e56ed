use crate::checkpoint::Checkpoint;
use crate::stage1_extract::run_stage1;
use crate::stage2_quality::run_stage2;
use crate::stage3_normalize::run_stage3;
use crate::stage4_standardize::{run_stage4, StandardizeConfig};
use hte_agents::{BilingualExtractAgent, QualityCheckAgent, TextPairEntry};
use hte_core::HteError;
use hte_termbase::{Term, Termbase};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use hte_telemetry::info;

use crate::normalize_agent::NormalizeAgent;

pub struct PipelineConfig {
    pub extraction_batch_size: usize,
    pub max_concurrent: usize,
    pub quality_check_batch_size: usize,
    pub normalization_batch_size: usize,
    pub start_from_stage: u8,
    pub checkpoint_path: Option<PathBuf>,
    pub standardize: StandardizeConfig,
    pub source_language: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extraction_batch_size: 10,
            max_concurrent: 4,
            quality_check_batch_size: 10,
            normalization_batch_size: 10,
            start_from_stage: 1,
            checkpoint_path: None,
            standardize: StandardizeConfig::default(),
            source_language: "zh".to_string(),
        }
    }
}

pub struct BtepPipeline {
    pub extract_agent: BilingualExtractAgent,
    pub quality_agent: QualityCheckAgent,
    pub normalize_agent: NormalizeAgent,
    pub config: PipelineConfig,
}

impl BtepPipeline {
    #[must_use]
    pub fn new(extract_agent: BilingualExtractAgent, quality_agent: QualityCheckAgent, normalize_agent: NormalizeAgent, config: PipelineConfig) -> Self {
        Self { extract_agent, quality_agent, normalize_agent, config }
    }

    fn load_checkpoint(&self) -> Checkpoint {
        let mut checkpoint = match &self.config.checkpoint_path {
            Some(path) if path.exists() => Checkpoint::load(path).unwrap_or_default(),
            _ => Checkpoint::default(),
        };
        checkpoint.clear_from_stage(self.config.start_from_stage);
        checkpoint
    }

    fn save_checkpoint(&self, checkpoint: &Checkpoint) -> Result<(), HteError> {
        match &self.config.checkpoint_path {
            Some(path) => checkpoint.save(path),
            None => Ok(()),
        }
    }

    /// Runs the four stages in order, resuming from `start_from_stage`
    /// using whatever the checkpoint already holds for earlier stages.
    /// Persists the checkpoint after every stage that actually ran.
    pub async fn run(&self, entries: &[TextPairEntry]) -> Result<Checkpoint, HteError> {
        let mut checkpoint = self.load_checkpoint();
        let entries_by_id: HashMap<String, TextPairEntry> = entries.iter().filter_map(|e| e.entry_id.clone().map(|id| (id, e.clone()))).collect();

        if self.config.start_from_stage <= 1 {
            info!(entries = entries.len(), "btep stage1: extract");
            checkpoint.all_extracted_terms = run_stage1(&self.extract_agent, entries, self.config.extraction_batch_size, self.config.max_concurrent).await;
            self.save_checkpoint(&checkpoint)?;
        }

        if self.config.start_from_stage <= 2 {
            info!(terms = checkpoint.all_extracted_terms.len(), "btep stage2: quality check");
            checkpoint.all_filtered_terms = run_stage2(&self.quality_agent, checkpoint.all_extracted_terms.clone(), &entries_by_id, self.config.quality_check_batch_size).await;
            self.save_checkpoint(&checkpoint)?;
        }

        if self.config.start_from_stage <= 3 {
            info!(terms = checkpoint.all_filtered_terms.len(), "btep stage3: normalize");
            checkpoint.all_normalized_terms = run_stage3(&self.normalize_agent, checkpoint.all_filtered_terms.clone(), &self.config.source_language, self.config.normalization_batch_size).await;
            self.save_checkpoint(&checkpoint)?;
        }

        if self.config.start_from_stage <= 4 {
            info!(terms = checkpoint.all_normalized_terms.len(), "btep stage4: standardize");
            checkpoint.all_standardized_terms = run_stage4(checkpoint.all_normalized_terms.clone(), &self.config.standardize);
            checkpoint.all_terms = checkpoint.all_standardized_terms.clone();
            self.save_checkpoint(&checkpoint)?;
        }

        Ok(checkpoint)
    }

    /// Writes every standardized term in `checkpoint` to the termbase.
    pub async fn persist_to_termbase(&self, checkpoint: &Checkpoint, termbase: &Termbase) -> Result<usize, HteError> {
        let terms: Vec<Term> = checkpoint
            .all_terms
            .iter()
            .map(|standardized| {
                let mut term = Term::new(&standardized.normalized_source, &standardized.normalized_target, &standardized.source_lang, &standardized.target_lang);
                term.confidence = standardized.confidence;
                term.quality_score = standardized.quality_score;
                term.combined_score = standardized.combined_score;
                term.category = standardized.category.clone();
                term.domain = standardized.domain.clone();
                term.law = standardized.law.clone();
                term.year = standardized.year;
                term.occurrence_count = standardized.occurrence_count;
                term.entry_id = standardized.entry_id.clone();
                term
            })
            .collect();

        termbase.batch_add_terms(terms).await
    }
}

pub fn checkpoint_path(stage_dir: impl AsRef<Path>) -> PathBuf {
    stage_dir.as_ref().join("checkpoint.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use hte_llm::StubLlmClient;

    fn entry(id: &str, source: &str, target: &str) -> TextPairEntry {
        TextPairEntry { source_text: source.to_string(), target_text: target.to_string(), law: None, domain: None, year: None, entry_id: Some(id.to_string()) }
    }

    #[tokio::test]
    async fn run_from_scratch_produces_standardized_terms_ready_for_termbase() {
        let extract_stub = StubLlmClient::new().with_default(hte_llm::ChatResponse {
            content: serde_json::json!({"results": [[{"source_term": "合同法", "target_term": "contract law", "confidence": 0.9}]]}).to_string(),
            finish_reason: "stop".into(),
            ..Default::default()
        });
        let quality_stub = StubLlmClient::new().with_default(hte_llm::ChatResponse {
            content: serde_json::json!({"verdicts": [{"is_valid": true, "quality_score": 0.85}]}).to_string(),
            finish_reason: "stop".into(),
            ..Default::default()
        });
        let normalize_stub = StubLlmClient::new().with_default(hte_llm::ChatResponse {
            content: serde_json::json!({"normalized": ["合同法"]}).to_string(),
            finish_reason: "stop".into(),
            ..Default::default()
        });

        let pipeline = BtepPipeline::new(
            BilingualExtractAgent::new(Arc::new(extract_stub)),
            QualityCheckAgent::new(Arc::new(quality_stub)),
            NormalizeAgent::new(Arc::new(normalize_stub)),
            PipelineConfig::default(),
        );

        let entries = vec![entry("e1", "合同法规定", "contract law provides")];
        let checkpoint = pipeline.run(&entries).await.unwrap();

        assert_eq!(checkpoint.all_terms.len(), 1);
        assert_eq!(checkpoint.all_terms[0].normalized_source, "合同法");
        assert!(checkpoint.all_terms[0].combined_score > 0.0);

        let termbase = Termbase::open(":memory:").unwrap();
        let inserted = pipeline.persist_to_termbase(&checkpoint, &termbase).await.unwrap();
        assert_eq!(inserted, 1);
    }

    #[tokio::test]
    async fn start_from_stage_three_reuses_prior_stage_output() {
        let normalize_stub = StubLlmClient::new().with_default(hte_llm::ChatResponse {
            content: serde_json::json!({"normalized": ["合同法"]}).to_string(),
            finish_reason: "stop".into(),
            ..Default::default()
        });
        let pipeline = BtepPipeline::new(
            BilingualExtractAgent::new(Arc::new(StubLlmClient::new())),
            QualityCheckAgent::new(Arc::new(StubLlmClient::new())),
            NormalizeAgent::new(Arc::new(normalize_stub)),
            PipelineConfig { start_from_stage: 3, ..PipelineConfig::default() },
        );

        let mut checkpoint = Checkpoint::default();
        checkpoint.all_filtered_terms = vec![crate::model::QualityCheckedTerm {
            term: hte_agents::AttributedTerm {
                source_term: "合同法".to_string(),
                target_term: "contract law".to_string(),
                confidence: 0.9,
                category: None,
                source_context: None,
                target_context: None,
                law: None,
                domain: None,
                year: None,
                entry_id: Some("e1".to_string()),
            },
            quality_score: 0.8,
        }];

        let tmp = std::env::temp_dir().join(format!("btep-checkpoint-test-{}.json", std::process::id()));
        checkpoint.save(&tmp).unwrap();

        let pipeline = BtepPipeline::new(pipeline.extract_agent, pipeline.quality_agent, pipeline.normalize_agent, PipelineConfig { start_from_stage: 3, checkpoint_path: Some(tmp.clone()), ..PipelineConfig::default() });

        let result = pipeline.run(&[]).await.unwrap();
        assert_eq!(result.all_normalized_terms.len(), 1);
        assert_eq!(result.all_extracted_terms.len(), 0);

        std::fs::remove_file(&tmp).ok();
    }
}
