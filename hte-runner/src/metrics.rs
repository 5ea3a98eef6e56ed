use hte_core::text::word_overlap_ratio;
use serde::Serialize;

/// Cheap, dependency-free stand-ins the runner computes locally during a
/// run; the full evaluation suite (C9) is run separately over the result
/// file for the metrics that need a real scorer.
#[derive(Debug, Clone, Serialize, Default)]
pub struct LocalMetrics {
    pub termbase_hit_rate: f64,
    pub deontic_preservation: f64,
    pub conditional_preservation: f64,
    pub lexical_overlap_comet_placeholder: f64,
}

const DEONTIC_MARKERS_ZH: &[&str] = &["应当", "必须", "不得"];
const DEONTIC_MARKERS_EN: &[&str] = &["shall", "must", "may not"];
const CONDITIONAL_MARKERS_ZH: &[&str] = &["如果", "若"];
const CONDITIONAL_MARKERS_EN: &[&str] = &["if", "where", "provided that"];

pub fn compute_local_metrics(source: &str, prediction: &str, term_table_size: usize, matched_terms: usize) -> LocalMetrics {
    LocalMetrics {
        termbase_hit_rate: if term_table_size == 0 { 0.0 } else { matched_terms as f64 / term_table_size as f64 },
        deontic_preservation: marker_preservation(source, prediction, DEONTIC_MARKERS_ZH, DEONTIC_MARKERS_EN),
        conditional_preservation: marker_preservation(source, prediction, CONDITIONAL_MARKERS_ZH, CONDITIONAL_MARKERS_EN),
        lexical_overlap_comet_placeholder: word_overlap_ratio(source, prediction),
    }
}

/// A simplified deontic/conditional preservation check: counts source-side
/// marker occurrences and checks the target carries a proportionate number
/// of its own markers, since no aligned-term mapping is available locally.
fn marker_preservation(source: &str, prediction: &str, zh_markers: &[&str], en_markers: &[&str]) -> f64 {
    let source_count: usize = zh_markers.iter().map(|m| source.matches(m).count()).sum();
    if source_count == 0 {
        return 1.0;
    }
    let prediction_lower = prediction.to_lowercase();
    let target_count: usize = en_markers.iter().map(|m| prediction_lower.matches(m).count()).sum();
    (target_count.min(source_count) as f64 / source_count as f64).clamp(0.0, 1.0)
}
