use crate::model::QualityCheckedTerm;
use hte_agents::{AttributedTerm, QualityCheckAgent, TextPairEntry};
use std::collections::{HashMap, HashSet};

const CONTEXT_CHAR_LIMIT: usize = 5000;

/// Stage 2: chunks all extracted terms (regardless of originating
/// micro-batch) into fixed-size groups, synthesizes a shared context per
/// chunk from the entries referenced by any term in it, and judges each
/// chunk in one LLM call. Drops invalid terms, keeps `quality_score` on
/// the rest, then deduplicates on `(source_term, target_term)`.
pub async fn run_stage2(agent: &QualityCheckAgent, terms: Vec<AttributedTerm>, entries_by_id: &HashMap<String, TextPairEntry>, quality_check_batch_size: usize) -> Vec<QualityCheckedTerm> {
    let chunk_size = quality_check_batch_size.max(1);
    let mut out = Vec::new();

    for chunk in terms.chunks(chunk_size) {
        let (source_context, target_context) = synthesize_context(chunk, entries_by_id);
        let pairs: Vec<(String, String)> = chunk.iter().map(|t| (t.source_term.clone(), t.target_term.clone())).collect();
        let verdicts = agent.check_batch(&pairs, &source_context, &target_context).await;

        for (term, verdict) in chunk.iter().zip(verdicts) {
            if verdict.is_valid {
                out.push(QualityCheckedTerm { term: term.clone(), quality_score: verdict.quality_score });
            }
        }
    }

    dedup_by_pair(out)
}

fn synthesize_context(chunk: &[AttributedTerm], entries_by_id: &HashMap<String, TextPairEntry>) -> (String, String) {
    let mut source_parts = Vec::new();
    let mut target_parts = Vec::new();
    let mut seen_ids = HashSet::new();

    for term in chunk {
        let Some(entry_id) = &term.entry_id else { continue };
        if !seen_ids.insert(entry_id.clone()) {
            continue;
        }
        if let Some(entry) = entries_by_id.get(entry_id) {
            source_parts.push(entry.source_text.clone());
            target_parts.push(entry.target_text.clone());
        }
    }

    (truncate_chars(&source_parts.join(" "), CONTEXT_CHAR_LIMIT), truncate_chars(&target_parts.join(" "), CONTEXT_CHAR_LIMIT))
}

fn truncate_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

fn dedup_by_pair(terms: Vec<QualityCheckedTerm>) -> Vec<QualityCheckedTerm> {
    let mut seen = HashSet::new();
    terms.into_iter().filter(|t| seen.insert((t.term.source_term.clone(), t.term.target_term.clone()))).collect()
}
