use crate::backend::MetricBackend;
use crate::ngram::char_ngrams;
use crate::Triple;
use async_trait::async_trait;
use std::collections::HashMap;

const MAX_CHAR_N: usize = 6;
const BETA_SQUARED: f64 = 4.0; // chrF++ default beta=2, weights recall 2x precision

/// chrF++ approximation: averages character n-gram (1-6) F-beta scores.
/// Word n-grams are folded in as an additional "n-gram order" over
/// whitespace-split tokens to approximate the "++" word-level component,
/// without pulling in a dedicated tokenizer.
pub struct ChrfScorer;

#[async_trait]
impl MetricBackend for ChrfScorer {
    fn name(&self) -> &'static str {
        "chrf"
    }

    async fn score(&self, triple: &Triple) -> f64 {
        if triple.prediction.trim().is_empty() || triple.reference.trim().is_empty() {
            return 0.0;
        }

        let mut f_scores = Vec::with_capacity(MAX_CHAR_N + 2);
        for n in 1..=MAX_CHAR_N {
            let cand = char_ngrams(&triple.prediction, n);
            let refr = char_ngrams(&triple.reference, n);
            if let Some(f) = f_beta(&cand, &refr) {
                f_scores.push(f);
            }
        }

        let cand_words: Vec<String> = triple.prediction.split_whitespace().map(String::from).collect();
        let ref_words: Vec<String> = triple.reference.split_whitespace().map(String::from).collect();
        for n in 1..=2 {
            let cand = word_ngrams(&cand_words, n);
            let refr = word_ngrams(&ref_words, n);
            if let Some(f) = f_beta(&cand, &refr) {
                f_scores.push(f);
            }
        }

        if f_scores.is_empty() {
            return 0.0;
        }
        f_scores.iter().sum::<f64>() / f_scores.len() as f64
    }
}

fn word_ngrams(tokens: &[String], n: usize) -> Vec<String> {
    if tokens.len() < n || n == 0 {
        return Vec::new();
    }
    tokens.windows(n).map(|w| w.join(" ")).collect()
}

fn f_beta(candidate: &[String], reference: &[String]) -> Option<f64> {
    if candidate.is_empty() && reference.is_empty() {
        return None;
    }
    if candidate.is_empty() || reference.is_empty() {
        return Some(0.0);
    }

    let mut ref_counts: HashMap<&str, usize> = HashMap::new();
    for g in reference {
        *ref_counts.entry(g.as_str()).or_insert(0) += 1;
    }
    let mut cand_counts: HashMap<&str, usize> = HashMap::new();
    for g in candidate {
        *cand_counts.entry(g.as_str()).or_insert(0) += 1;
    }

    let matched: usize = cand_counts.iter().map(|(g, c)| (*c).min(*ref_counts.get(g).unwrap_or(&0))).sum();
    let precision = matched as f64 / candidate.len() as f64;
    let recall = matched as f64 / reference.len() as f64;

    if precision + recall == 0.0 {
        return Some(0.0);
    }
    Some((1.0 + BETA_SQUARED) * precision * recall / (BETA_SQUARED * precision + recall))
}
