use crate::backend::MetricBackend;
use crate::Triple;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// One evaluated sample: the triple plus whatever grouping metadata
/// (`law`, `domain`, ...) the caller wants aggregated by.
pub struct EvalSample {
    pub triple: Triple,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct AblationReport {
    pub avg_scores: HashMap<String, f64>,
    pub grouped_avg: Option<HashMap<String, HashMap<String, f64>>>,
    pub group_counts: Option<HashMap<String, usize>>,
}

/// Thin façade over a set of `MetricBackend`s: scores every sample with
/// every backend, then averages overall and (optionally) within each
/// distinct value of a metadata field.
pub struct EvaluationSuite {
    backends: Vec<Arc<dyn MetricBackend>>,
}

impl EvaluationSuite {
    #[must_use]
    pub fn new(backends: Vec<Arc<dyn MetricBackend>>) -> Self {
        Self { backends }
    }

    pub async fn score_ablation(&self, samples: &[EvalSample], group_by_field: Option<&str>) -> AblationReport {
        if samples.is_empty() {
            return AblationReport::default();
        }

        let triples: Vec<Triple> = samples.iter().map(|s| s.triple.clone()).collect();
        let mut per_metric_scores: HashMap<&'static str, Vec<f64>> = HashMap::new();

        for backend in &self.backends {
            let scores = backend.score_batch(&triples).await;
            per_metric_scores.insert(backend.name(), scores);
        }

        let avg_scores = per_metric_scores.iter().map(|(name, scores)| ((*name).to_string(), average(scores))).collect();

        let (grouped_avg, group_counts) = match group_by_field {
            Some(field) => self.group(samples, field, &per_metric_scores),
            None => (None, None),
        };

        AblationReport { avg_scores, grouped_avg, group_counts }
    }

    fn group(&self, samples: &[EvalSample], field: &str, per_metric_scores: &HashMap<&'static str, Vec<f64>>) -> (Option<HashMap<String, HashMap<String, f64>>>, Option<HashMap<String, usize>>) {
        let mut indices_by_group: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, sample) in samples.iter().enumerate() {
            let key = sample.metadata.get(field).and_then(|v| v.as_str()).unwrap_or("unknown").to_string();
            indices_by_group.entry(key).or_default().push(i);
        }

        let mut grouped_avg = HashMap::new();
        let mut group_counts = HashMap::new();

        for (group, indices) in &indices_by_group {
            group_counts.insert(group.clone(), indices.len());
            let mut metric_avgs = HashMap::new();
            for (metric_name, scores) in per_metric_scores {
                let subset: Vec<f64> = indices.iter().map(|&i| scores[i]).collect();
                metric_avgs.insert((*metric_name).to_string(), average(&subset));
            }
            grouped_avg.insert(group.clone(), metric_avgs);
        }

        (Some(grouped_avg), Some(group_counts))
    }
}

fn average(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bleu::BleuScorer;

    fn sample(prediction: &str, reference: &str, law: &str) -> EvalSample {
        EvalSample { triple: Triple::new("source", prediction, reference), metadata: serde_json::json!({"law": law}) }
    }

    #[tokio::test]
    async fn grouped_aggregation_splits_by_metadata_field() {
        let suite = EvaluationSuite::new(vec![Arc::new(BleuScorer)]);
        let samples = vec![sample("the quick brown fox", "the quick brown fox", "contract_law"), sample("totally unrelated", "the quick brown fox", "tort_law")];

        let report = suite.score_ablation(&samples, Some("law")).await;

        let grouped = report.grouped_avg.unwrap();
        assert!(grouped["contract_law"]["bleu"] > grouped["tort_law"]["bleu"]);
        assert_eq!(report.group_counts.unwrap()["contract_law"], 1);
    }

    #[tokio::test]
    async fn empty_samples_yields_default_report() {
        let suite = EvaluationSuite::new(vec![Arc::new(BleuScorer)]);
        let report = suite.score_ablation(&[], None).await;
        assert!(report.avg_scores.is_empty());
    }
}
