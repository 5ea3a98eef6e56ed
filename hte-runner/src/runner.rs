use crate::ablation::AblationConfig;
use crate::metrics::compute_local_metrics;
use crate::result::{EMPTY_TRANSLATION_ERROR, SampleResult};
use crate::sample::Sample;
use futures::stream::{self, StreamExt};
use hte_translator::{HierarchicalTranslator, TranslateRequest};
use std::collections::HashMap;
use std::sync::Arc;

/// Executes every ablation over every sample with bounded parallelism
/// (`max_concurrent` in-flight samples at a time, independent of the LLM
/// client's own concurrency gate — the two stack multiplicatively). Order
/// of the returned per-ablation list always follows the input sample
/// order, never completion order.
pub struct ExperimentRunner {
    translator: Arc<HierarchicalTranslator>,
    src_lang: String,
    tgt_lang: String,
    max_concurrent: usize,
}

impl ExperimentRunner {
    #[must_use]
    pub fn new(translator: Arc<HierarchicalTranslator>, src_lang: impl Into<String>, tgt_lang: impl Into<String>, max_concurrent: usize) -> Self {
        Self { translator, src_lang: src_lang.into(), tgt_lang: tgt_lang.into(), max_concurrent: max_concurrent.max(1) }
    }

    pub async fn run_ablation(&self, ablation: &AblationConfig, samples: &[Sample]) -> Vec<SampleResult> {
        let tasks = samples.iter().map(|sample| {
            let translator = Arc::clone(&self.translator);
            let ablation = ablation.clone();
            let sample = sample.clone();
            let src_lang = self.src_lang.clone();
            let tgt_lang = self.tgt_lang.clone();
            async move { run_one(&translator, &ablation, &sample, &src_lang, &tgt_lang).await }
        });

        stream::iter(tasks).buffered(self.max_concurrent).collect().await
    }

    /// Runs every ablation, then, if the `full` ablation was included and
    /// `save_intermediate` is set, derives `terminology` and
    /// `terminology_syntax` pseudo-ablations by projecting `trace.r1` and
    /// `trace.r2` output respectively. Derived records share sample ids
    /// with `full` and carry no trace of their own.
    pub async fn run(&self, ablations: &[AblationConfig], samples: &[Sample], save_intermediate: bool) -> HashMap<String, Vec<SampleResult>> {
        let mut out = HashMap::new();
        for ablation in ablations {
            let results = self.run_ablation(ablation, samples).await;
            if ablation.name == "full" && save_intermediate {
                out.insert("terminology".to_string(), project_round(&results, |t| t.r1.as_ref().map(|r| r.output_text.clone())));
                out.insert("terminology_syntax".to_string(), project_round(&results, |t| t.r2.as_ref().map(|r| r.output_text.clone())));
            }
            out.insert(ablation.name.clone(), results);
        }
        out
    }
}

async fn run_one(translator: &HierarchicalTranslator, ablation: &AblationConfig, sample: &Sample, src_lang: &str, tgt_lang: &str) -> SampleResult {
    let request = TranslateRequest {
        source_text: sample.source.clone(),
        src_lang: src_lang.to_string(),
        tgt_lang: tgt_lang.to_string(),
        hierarchical: ablation.hierarchical,
        use_termbase: ablation.use_termbase,
        use_tm: ablation.use_tm,
        max_rounds: ablation.max_rounds,
    };

    let trace = translator.translate(&request, &ablation.control).await;
    let prediction = trace.final_text();

    if prediction.trim().is_empty() {
        return SampleResult {
            sample_id: sample.id.clone(),
            source: sample.source.clone(),
            target: sample.target.clone(),
            prediction: sample.source.clone(),
            success: false,
            metrics: None,
            trace: Some(trace),
            metadata: sample.metadata.clone(),
            error: Some(EMPTY_TRANSLATION_ERROR.to_string()),
        };
    }

    let term_table_size = trace.r1.as_ref().map(|r| r.term_table.len()).unwrap_or(0);
    let metrics = compute_local_metrics(&sample.source, &prediction, term_table_size, term_table_size);

    SampleResult {
        sample_id: sample.id.clone(),
        source: sample.source.clone(),
        target: sample.target.clone(),
        prediction,
        success: true,
        metrics: Some(metrics),
        trace: Some(trace),
        metadata: sample.metadata.clone(),
        error: None,
    }
}

fn project_round(results: &[SampleResult], pick: impl Fn(&hte_translator::Trace) -> Option<String>) -> Vec<SampleResult> {
    results
        .iter()
        .map(|r| {
            let prediction = r.trace.as_ref().and_then(&pick).unwrap_or_else(|| r.prediction.clone());
            SampleResult {
                sample_id: r.sample_id.clone(),
                source: r.source.clone(),
                target: r.target.clone(),
                prediction,
                success: r.success,
                metrics: r.metrics.clone(),
                trace: None,
                metadata: r.metadata.clone(),
                error: r.error.clone(),
            }
        })
        .collect()
}
