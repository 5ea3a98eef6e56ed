//! Offline Bilingual Term Extraction Pipeline (C8): Extract -> Quality
//! Check -> Normalize -> Standardize, with checkpointed resume.

pub mod checkpoint;
pub mod model;
pub mod normalize_agent;
pub mod normalize_rules;
pub mod pipeline;
pub mod stage1_extract;
pub mod stage2_quality;
pub mod stage3_normalize;
pub mod stage4_standardize;

pub use checkpoint::Checkpoint;
pub use model::{NormalizedTerm, QualityCheckedTerm, StandardizedTerm};
pub use normalize_agent::NormalizeAgent;
pub use pipeline::{checkpoint_path, BtepPipeline, PipelineConfig};
pub use stage1_extract::run_stage1;
pub use stage2_quality::run_stage2;
pub use stage3_normalize::run_stage3;
pub use stage4_standardize::{run_stage4, StandardizeConfig};
