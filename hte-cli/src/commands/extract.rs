use crate::config;
use anyhow::{Context, Result};
use hte_agents::{BilingualExtractAgent, QualityCheckAgent, TextPairEntry};
use hte_btep::{BtepPipeline, NormalizeAgent, PipelineConfig, StandardizeConfig};
use hte_telemetry::info;
use std::path::PathBuf;
use std::sync::Arc;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    input_file: PathBuf,
    batch_size: usize,
    max_concurrent: usize,
    extraction_batch_size: Option<usize>,
    quality_check_batch_size: Option<usize>,
    normalization_batch_size: Option<usize>,
    max_targets_per_source: usize,
    confidence_weight: f64,
    quality_weight: f64,
    mut checkpoint: PathBuf,
    stage_dir: Option<PathBuf>,
    no_resume: bool,
    clean_checkpoint: bool,
    start_from_stage: u8,
    max_entries: Option<usize>,
) -> Result<()> {
    if !(1..=4).contains(&start_from_stage) {
        anyhow::bail!("--start-from-stage must be between 1 and 4");
    }

    if let Some(dir) = stage_dir {
        checkpoint = dir.join(checkpoint);
    }
    if clean_checkpoint && checkpoint.exists() {
        std::fs::remove_file(&checkpoint).context("removing checkpoint file")?;
    }

    let raw = std::fs::read_to_string(&input_file).with_context(|| format!("reading input file {}", input_file.display()))?;
    let mut entries: Vec<TextPairEntry> = serde_json::from_str(&raw).context("parsing input file as a JSON array of text pairs")?;
    if let Some(limit) = max_entries {
        entries.truncate(limit);
    }
    info!(entries = entries.len(), "loaded text pairs for extraction");

    let llm = config::build_llm_client()?;

    let pipeline_config = PipelineConfig {
        extraction_batch_size: extraction_batch_size.unwrap_or(batch_size),
        max_concurrent,
        quality_check_batch_size: quality_check_batch_size.unwrap_or(batch_size),
        normalization_batch_size: normalization_batch_size.unwrap_or(batch_size),
        start_from_stage: if no_resume { 1 } else { start_from_stage },
        checkpoint_path: Some(checkpoint.clone()),
        standardize: StandardizeConfig { confidence_weight, quality_weight, max_targets_per_source, ..StandardizeConfig::default() },
        source_language: "zh".to_string(),
    };

    let pipeline = BtepPipeline::new(
        BilingualExtractAgent::new(Arc::clone(&llm)),
        QualityCheckAgent::new(Arc::clone(&llm)),
        NormalizeAgent::new(Arc::clone(&llm)),
        pipeline_config,
    );

    let result = tokio::select! {
        result = pipeline.run(&entries) => result.context("running the term extraction pipeline")?,
        _ = tokio::signal::ctrl_c() => {
            info!(checkpoint = %checkpoint.display(), "interrupted, last completed stage is saved in the checkpoint");
            return Ok(());
        }
    };
    info!(terms = result.all_terms.len(), "extraction pipeline finished");

    let termbase = config::build_termbase()?;
    let inserted = pipeline.persist_to_termbase(&result, &termbase).await.context("writing extracted terms to the termbase")?;
    info!(inserted, checkpoint = %checkpoint.display(), "persisted terms to termbase");

    Ok(())
}
