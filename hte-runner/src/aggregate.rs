use crate::result::SampleResult;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, Default)]
pub struct AggregateStats {
    pub total_samples: usize,
    pub successful_samples: usize,
    pub r1_to_r2_modification_rate: f64,
    pub r2_to_r3_modification_rate: f64,
    pub r1_to_r3_modification_rate: f64,
    pub r2_gating_rate: f64,
    pub r3_gating_rate: f64,
    pub avg_termbase_hit_rate: f64,
    pub avg_deontic_preservation: f64,
    pub avg_conditional_preservation: f64,
    pub avg_lexical_overlap: f64,
}

#[must_use]
pub fn aggregate(results: &[SampleResult]) -> AggregateStats {
    let total_samples = results.len();
    let successful_samples = results.iter().filter(|r| r.success).count();

    let traced: Vec<&SampleResult> = results.iter().filter(|r| r.trace.is_some()).collect();
    let with_r2: Vec<&SampleResult> = traced.iter().filter(|r| r.trace.as_ref().unwrap().r2.is_some()).copied().collect();
    let with_r3: Vec<&SampleResult> = traced.iter().filter(|r| r.trace.as_ref().unwrap().r3.is_some()).copied().collect();

    let r1_to_r2 = rate(&with_r2, |r| {
        let trace = r.trace.as_ref().unwrap();
        trace.r1.as_ref().unwrap().output_text != trace.r2.as_ref().unwrap().output_text
    });
    let r2_to_r3 = rate(&with_r3, |r| {
        let trace = r.trace.as_ref().unwrap();
        trace.r2.as_ref().unwrap().output_text != trace.r3.as_ref().unwrap().output_text
    });
    let r1_to_r3 = rate(&with_r3, |r| {
        let trace = r.trace.as_ref().unwrap();
        trace.r1.as_ref().unwrap().output_text != trace.r3.as_ref().unwrap().output_text
    });
    let r2_gating_rate = rate(&with_r2, |r| r.trace.as_ref().unwrap().r2.as_ref().unwrap().gated);
    let r3_gating_rate = rate(&with_r3, |r| r.trace.as_ref().unwrap().r3.as_ref().unwrap().gated);

    let metric_samples: Vec<&SampleResult> = results.iter().filter(|r| r.metrics.is_some()).collect();
    let avg = |f: fn(&crate::metrics::LocalMetrics) -> f64| {
        if metric_samples.is_empty() {
            0.0
        } else {
            metric_samples.iter().map(|r| f(r.metrics.as_ref().unwrap())).sum::<f64>() / metric_samples.len() as f64
        }
    };

    AggregateStats {
        total_samples,
        successful_samples,
        r1_to_r2_modification_rate: r1_to_r2,
        r2_to_r3_modification_rate: r2_to_r3,
        r1_to_r3_modification_rate: r1_to_r3,
        r2_gating_rate,
        r3_gating_rate,
        avg_termbase_hit_rate: avg(|m| m.termbase_hit_rate),
        avg_deontic_preservation: avg(|m| m.deontic_preservation),
        avg_conditional_preservation: avg(|m| m.conditional_preservation),
        avg_lexical_overlap: avg(|m| m.lexical_overlap_comet_placeholder),
    }
}

fn rate(items: &[&SampleResult], predicate: impl Fn(&SampleResult) -> bool) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    items.iter().filter(|r| predicate(r)).count() as f64 / items.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::LocalMetrics;
    use hte_translator::Trace;
    use hte_workflows::{SyntaxResult, TerminologyResult};

    fn result_with_rounds(r1_text: &str, r2_text: &str, r2_gated: bool) -> SampleResult {
        SampleResult {
            sample_id: "s1".to_string(),
            source: "source".to_string(),
            target: "target".to_string(),
            prediction: r2_text.to_string(),
            success: true,
            metrics: Some(LocalMetrics { termbase_hit_rate: 1.0, ..Default::default() }),
            trace: Some(Trace {
                r1: Some(TerminologyResult {
                    source_text: "source".to_string(),
                    output_text: r1_text.to_string(),
                    term_table: Vec::new(),
                    gated: false,
                    candidates: Vec::new(),
                    selected_index: 0,
                    selector_reason: String::new(),
                }),
                r2: Some(SyntaxResult { output_text: r2_text.to_string(), gated: r2_gated, candidates: Vec::new(), selected_index: 0, selector_reason: String::new() }),
                r3: None,
                baseline: None,
            }),
            metadata: serde_json::json!({}),
            error: None,
        }
    }

    #[test]
    fn aggregate_reports_modification_and_gating_rates() {
        let results = vec![result_with_rounds("r1 text", "r2 text", false), result_with_rounds("same text", "same text", true)];
        let stats = aggregate(&results);
        assert_eq!(stats.total_samples, 2);
        assert_eq!(stats.successful_samples, 2);
        assert!((stats.r1_to_r2_modification_rate - 0.5).abs() < 1e-9);
        assert!((stats.r2_gating_rate - 0.5).abs() < 1e-9);
        assert!((stats.avg_termbase_hit_rate - 1.0).abs() < 1e-9);
    }
}
