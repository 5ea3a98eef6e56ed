use crate::{config, wiring};
use anyhow::{Context, Result};
use hte_eval::{BleuScorer, ChrfScorer, EvalSample, EvaluationSuite, MetricBackend, Triple};
use hte_runner::{AblationConfig, ExperimentRunner, Sample};
use hte_telemetry::info;
use std::path::PathBuf;
use std::sync::Arc;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    samples: PathBuf,
    ablations: String,
    max_concurrent: usize,
    test_set: PathBuf,
    save_intermediate: bool,
    selection_layers: String,
    num_candidates: usize,
    gating_layers: String,
    term_gate_threshold: f64,
    syntax_gate_threshold: f64,
    discourse_gate_threshold: f64,
    tm_gate_threshold: f64,
    enable_quality_assessment: bool,
) -> Result<()> {
    let raw = std::fs::read_to_string(&samples).with_context(|| format!("reading sample file {}", samples.display()))?;
    let samples: Vec<Sample> = serde_json::from_str(&raw).context("parsing samples as a JSON array")?;
    info!(samples = samples.len(), "loaded evaluation samples");

    let selection = config::parse_layers(&selection_layers)?;
    let gating = config::parse_layers(&gating_layers)?;
    let control = config::build_control_config(selection, gating, num_candidates, term_gate_threshold, syntax_gate_threshold, discourse_gate_threshold, tm_gate_threshold);

    let ablation_configs: Vec<AblationConfig> = ablations
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|name| match name {
            "baseline" => AblationConfig::baseline(),
            "full" => AblationConfig::full(control.clone()),
            other => AblationConfig { name: other.to_string(), ..AblationConfig::full(control.clone()) },
        })
        .collect();

    if ablation_configs.is_empty() {
        anyhow::bail!("--ablations must name at least one ablation");
    }

    let llm = config::build_llm_client()?;
    let termbase = Arc::new(config::build_termbase()?);
    let tm_index = Arc::new(config::build_tm_index());
    let translator = Arc::new(wiring::build_translator(llm, termbase, tm_index));

    let runner = ExperimentRunner::new(translator, "zh", "en", max_concurrent);
    let results = tokio::select! {
        results = runner.run(&ablation_configs, &samples, save_intermediate) => results,
        _ = tokio::signal::ctrl_c() => {
            info!(output = %test_set.display(), "interrupted before the run finished, no result file written");
            return Ok(());
        }
    };

    let mut report = serde_json::to_value(&results).context("serializing experiment results")?;

    if enable_quality_assessment {
        let suite = EvaluationSuite::new(vec![Arc::new(BleuScorer) as Arc<dyn MetricBackend>, Arc::new(ChrfScorer)]);
        let mut quality_by_ablation = serde_json::Map::new();

        for (ablation_name, sample_results) in &results {
            let eval_samples: Vec<EvalSample> = sample_results
                .iter()
                .map(|r| EvalSample { triple: Triple::new(&r.source, &r.prediction, &r.target), metadata: r.metadata.clone() })
                .collect();
            let ablation_report = suite.score_ablation(&eval_samples, None).await;
            quality_by_ablation.insert(ablation_name.clone(), serde_json::to_value(&ablation_report)?);
        }

        if let Some(obj) = report.as_object_mut() {
            obj.insert("quality_assessment".to_string(), serde_json::Value::Object(quality_by_ablation));
        }
    }

    std::fs::write(&test_set, serde_json::to_string_pretty(&report)?).with_context(|| format!("writing result file {}", test_set.display()))?;
    info!(output = %test_set.display(), "experiment run finished");

    Ok(())
}
