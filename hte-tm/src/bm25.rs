use crate::model::TmEntry;
use hte_core::text::tokenize;
use std::collections::HashMap;

/// BM25Okapi parameters, matching the defaults of the reference Python
/// `rank_bm25` package this index replaces.
const K1: f64 = 1.5;
const B: f64 = 0.75;

/// In-memory BM25 index over the TM corpus. Rebuilt from scratch whenever
/// the corpus changes (cheap at the corpus sizes this system targets;
/// matches the "rebuild after each batch" contract in the spec rather than
/// maintaining incremental postings).
#[derive(Debug, Clone, Default)]
pub struct Bm25Index {
    corpus: Vec<TmEntry>,
    doc_tokens: Vec<Vec<String>>,
    doc_freqs: HashMap<String, usize>,
    avg_doc_len: f64,
}

impl Bm25Index {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[TmEntry] {
        &self.corpus
    }

    /// Appends entries and rebuilds postings. Call once per batch, not
    /// once per entry, to match the "BM25 is rebuilt once at the end"
    /// contract for batch inserts.
    pub fn add_entries(&mut self, entries: impl IntoIterator<Item = TmEntry>) {
        self.corpus.extend(entries);
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.doc_tokens = self.corpus.iter().map(|e| tokenize(&e.source_text)).collect();
        self.doc_freqs.clear();
        for tokens in &self.doc_tokens {
            let mut seen = std::collections::HashSet::new();
            for tok in tokens {
                if seen.insert(tok.clone()) {
                    *self.doc_freqs.entry(tok.clone()).or_insert(0) += 1;
                }
            }
        }
        let total_len: usize = self.doc_tokens.iter().map(Vec::len).sum();
        self.avg_doc_len =
            if self.doc_tokens.is_empty() { 0.0 } else { total_len as f64 / self.doc_tokens.len() as f64 };
    }

    fn idf(&self, term: &str) -> f64 {
        let n = self.corpus.len() as f64;
        let df = *self.doc_freqs.get(term).unwrap_or(&0) as f64;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    fn score(&self, query_tokens: &[String], doc_index: usize) -> f64 {
        let doc = &self.doc_tokens[doc_index];
        let doc_len = doc.len() as f64;
        let mut term_counts: HashMap<&str, usize> = HashMap::new();
        for tok in doc {
            *term_counts.entry(tok.as_str()).or_insert(0) += 1;
        }

        query_tokens
            .iter()
            .map(|q| {
                let freq = *term_counts.get(q.as_str()).unwrap_or(&0) as f64;
                if freq == 0.0 {
                    return 0.0;
                }
                let idf = self.idf(q);
                idf * (freq * (K1 + 1.0)) / (freq + K1 * (1.0 - B + B * doc_len / self.avg_doc_len.max(1e-9)))
            })
            .sum()
    }

    /// Raw BM25 scores for every document, in corpus order.
    #[must_use]
    pub fn scores(&self, query: &str) -> Vec<f64> {
        let query_tokens = tokenize(query);
        (0..self.corpus.len()).map(|i| self.score(&query_tokens, i)).collect()
    }

    /// Top-`top_k` matches by BM25 score, score normalized to roughly
    /// `[0, 1]` by dividing by 100 (per the external-interfaces contract),
    /// filtered by language pair.
    #[must_use]
    pub fn search(&self, query: &str, source_lang: Option<&str>, target_lang: Option<&str>, top_k: usize) -> Vec<(TmEntry, f64)> {
        if self.corpus.is_empty() {
            return Vec::new();
        }
        let scores = self.scores(query);
        let mut ranked: Vec<(usize, f64)> = scores.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        ranked
            .into_iter()
            .take(top_k * 2)
            .filter_map(|(i, score)| {
                let entry = &self.corpus[i];
                if let Some(lang) = source_lang {
                    if entry.source_lang != lang {
                        return None;
                    }
                }
                if let Some(lang) = target_lang {
                    if entry.target_lang != lang {
                        return None;
                    }
                }
                Some((entry.clone(), score / 100.0))
            })
            .take(top_k)
            .collect()
    }
}
