use std::collections::HashMap;

pub fn ngram_counts<T: Clone + Eq + std::hash::Hash>(tokens: &[T], n: usize) -> HashMap<Vec<T>, usize> {
    let mut counts = HashMap::new();
    if tokens.len() < n || n == 0 {
        return counts;
    }
    for window in tokens.windows(n) {
        *counts.entry(window.to_vec()).or_insert(0) += 1;
    }
    counts
}

/// Sum of per-ngram `min(candidate_count, reference_count)`, i.e. the
/// numerator of modified n-gram precision.
pub fn clipped_overlap<T: Clone + Eq + std::hash::Hash>(candidate: &HashMap<Vec<T>, usize>, reference: &HashMap<Vec<T>, usize>) -> usize {
    candidate.iter().map(|(gram, count)| (*count).min(*reference.get(gram).unwrap_or(&0))).sum()
}

pub fn char_ngrams(s: &str, n: usize) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < n || n == 0 {
        return Vec::new();
    }
    chars.windows(n).map(|w| w.iter().collect()).collect()
}
