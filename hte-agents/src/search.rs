use hte_termbase::{Term, TermSearchQuery, Termbase};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Looks up candidate glossary terms for a batch of source spans, deduping
/// on `(source_term, target_term, source_lang, target_lang)` and bounding
/// concurrent termbase lookups so a large batch doesn't starve the shared
/// blocking-task pool the termbase dispatches onto.
pub struct SearchAgent {
    termbase: Arc<Termbase>,
    semaphore: Arc<Semaphore>,
}

const MAX_CONCURRENT_LOOKUPS: usize = 10;

impl SearchAgent {
    #[must_use]
    pub fn new(termbase: Arc<Termbase>) -> Self {
        Self { termbase, semaphore: Arc::new(Semaphore::new(MAX_CONCURRENT_LOOKUPS)) }
    }

    pub async fn search_one(&self, term: &str, source_lang: &str, target_lang: &str, domain: Option<&str>) -> Vec<Term> {
        let _permit = self.semaphore.acquire().await.expect("semaphore never closed");
        self.termbase
            .search_terms(TermSearchQuery {
                term: term.to_string(),
                source_lang: Some(source_lang.to_string()),
                target_lang: Some(target_lang.to_string()),
                domain: domain.map(String::from),
                exact_match: false,
                limit: 5,
                ..Default::default()
            })
            .await
            .unwrap_or_default()
    }

    /// Searches the termbase for every term in `terms`, running up to
    /// `MAX_CONCURRENT_LOOKUPS` lookups concurrently, and returns the
    /// deduplicated union of all matches.
    pub async fn search_batch(&self, terms: &[String], source_lang: &str, target_lang: &str, domain: Option<&str>) -> Vec<Term> {
        let futures = terms.iter().map(|term| self.search_one(term, source_lang, target_lang, domain));
        let results = futures::future::join_all(futures).await;

        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for batch in results {
            for term in batch {
                let key = (term.source_term.clone(), term.target_term.clone(), term.source_lang.clone(), term.target_lang.clone());
                if seen.insert(key) {
                    out.push(term);
                }
            }
        }
        out
    }
}
