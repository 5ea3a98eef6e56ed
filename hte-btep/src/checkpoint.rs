use crate::model::{NormalizedTerm, QualityCheckedTerm, StandardizedTerm};
use hte_agents::AttributedTerm;
use hte_core::HteError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// BTEP's persisted run state. Invariant: at any time the checkpoint
/// reflects the union of results from stages that have completed at
/// least once; re-entering at stage N discards the fields for stages
/// >= N.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Checkpoint {
    pub processed_batches: Vec<usize>,
    pub all_extracted_terms: Vec<AttributedTerm>,
    pub all_filtered_terms: Vec<QualityCheckedTerm>,
    pub all_normalized_terms: Vec<NormalizedTerm>,
    pub all_standardized_terms: Vec<StandardizedTerm>,
    pub all_terms: Vec<StandardizedTerm>,
    pub stats: serde_json::Value,
}

impl Checkpoint {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HteError> {
        let raw = std::fs::read_to_string(path).map_err(HteError::Io)?;
        serde_json::from_str(&raw).map_err(HteError::Serde)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), HteError> {
        let raw = serde_json::to_string_pretty(self).map_err(HteError::Serde)?;
        std::fs::write(path, raw).map_err(HteError::Io)
    }

    /// `--start-from-stage N` semantics: clears every field stages >= N
    /// would have produced, so the pipeline recomputes from there.
    pub fn clear_from_stage(&mut self, stage: u8) {
        if stage <= 1 {
            self.processed_batches.clear();
            self.all_extracted_terms.clear();
        }
        if stage <= 2 {
            self.all_filtered_terms.clear();
        }
        if stage <= 3 {
            self.all_normalized_terms.clear();
        }
        if stage <= 4 {
            self.all_standardized_terms.clear();
            self.all_terms.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_from_stage_two_keeps_stage_one_output() {
        let mut checkpoint = Checkpoint::default();
        checkpoint.all_extracted_terms.push(AttributedTerm {
            source_term: "合同".to_string(),
            target_term: "contract".to_string(),
            confidence: 0.9,
            category: None,
            source_context: None,
            target_context: None,
            law: None,
            domain: None,
            year: None,
            entry_id: None,
        });
        checkpoint.all_filtered_terms.push(QualityCheckedTerm {
            term: checkpoint.all_extracted_terms[0].clone(),
            quality_score: 0.8,
        });

        checkpoint.clear_from_stage(2);
        assert_eq!(checkpoint.all_extracted_terms.len(), 1);
        assert!(checkpoint.all_filtered_terms.is_empty());
    }
}
