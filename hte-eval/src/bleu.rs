use crate::backend::MetricBackend;
use crate::ngram::{clipped_overlap, ngram_counts};
use crate::Triple;
use async_trait::async_trait;
use hte_core::text::tokenize;

const MAX_N: usize = 4;

/// Sentence-level BLEU (1-4 gram modified precision, geometric mean,
/// brevity penalty), with additive smoothing on zero-count n-grams so a
/// single short sentence doesn't collapse to 0.0.
pub struct BleuScorer;

#[async_trait]
impl MetricBackend for BleuScorer {
    fn name(&self) -> &'static str {
        "bleu"
    }

    async fn score(&self, triple: &Triple) -> f64 {
        let candidate = tokenize(&triple.prediction);
        let reference = tokenize(&triple.reference);

        if candidate.is_empty() || reference.is_empty() {
            return 0.0;
        }

        let mut log_precision_sum = 0.0;
        for n in 1..=MAX_N {
            let cand_grams = ngram_counts(&candidate, n);
            let ref_grams = ngram_counts(&reference, n);
            let total_cand = candidate.len().saturating_sub(n - 1).max(1) as f64;

            let overlap = clipped_overlap(&cand_grams, &ref_grams) as f64;
            // Smoothing: treat a zero overlap as a tiny positive count
            // instead of zeroing the whole geometric mean (common for
            // sentence-level BLEU where higher-order n-grams often miss).
            let precision = if overlap > 0.0 { overlap / total_cand } else { 1.0 / (2.0 * total_cand) };
            log_precision_sum += precision.ln();
        }

        let geometric_mean = (log_precision_sum / MAX_N as f64).exp();

        let c = candidate.len() as f64;
        let r = reference.len() as f64;
        let brevity_penalty = if c >= r { 1.0 } else { ((1.0 - r / c).exp()).min(1.0) };

        brevity_penalty * geometric_mean
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identical_sentences_score_near_one() {
        let t = Triple::new("src", "the quick brown fox jumps", "the quick brown fox jumps");
        let score = BleuScorer.score(&t).await;
        assert!(score > 0.95, "expected near-1.0, got {score}");
    }

    #[tokio::test]
    async fn unrelated_sentences_score_low() {
        let t = Triple::new("src", "completely different text here", "the quick brown fox jumps");
        let score = BleuScorer.score(&t).await;
        assert!(score < 0.3, "expected low score, got {score}");
    }

    #[tokio::test]
    async fn empty_prediction_scores_zero() {
        let t = Triple::new("src", "", "the quick brown fox");
        assert_eq!(BleuScorer.score(&t).await, 0.0);
    }
}
