use futures::stream::{self, StreamExt};
use hte_agents::{AttributedTerm, BilingualExtractAgent, TextPairEntry};
use std::collections::HashSet;

/// Stage 1: for each `extraction_batch_size`-sized micro-batch, calls
/// `BilingualExtract` in batch mode (single-pair mode degenerates to a
/// batch of one) and attaches entry-level metadata by substring match.
/// Runs micro-batches with up to `max_concurrent` in flight, then
/// deduplicates the concatenated result on `(source_term, target_term)`.
pub async fn run_stage1(agent: &BilingualExtractAgent, entries: &[TextPairEntry], extraction_batch_size: usize, max_concurrent: usize) -> Vec<AttributedTerm> {
    let chunk_size = extraction_batch_size.max(1);
    let micro_batches: Vec<&[TextPairEntry]> = entries.chunks(chunk_size).collect();

    let tasks = micro_batches.into_iter().map(|micro_batch| async move {
        let pairs: Vec<(String, String)> = micro_batch.iter().map(|e| (e.source_text.clone(), e.target_text.clone())).collect();
        let per_pair_terms = agent.extract_batch(&pairs, "zh", "en", pairs.len()).await;

        let flat: Vec<_> = per_pair_terms.into_iter().flatten().collect();
        BilingualExtractAgent::attribute_terms(flat, micro_batch)
    });

    let results: Vec<Vec<AttributedTerm>> = stream::iter(tasks).buffer_unordered(max_concurrent.max(1)).collect().await;

    dedup_by_pair(results.into_iter().flatten().collect())
}

/// Keeps the first occurrence of each `(source_term, target_term)` pair.
pub fn dedup_by_pair(terms: Vec<AttributedTerm>) -> Vec<AttributedTerm> {
    let mut seen = HashSet::new();
    terms.into_iter().filter(|t| seen.insert((t.source_term.clone(), t.target_term.clone()))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hte_llm::StubLlmClient;
    use std::sync::Arc;

    fn entry(source: &str, target: &str) -> TextPairEntry {
        TextPairEntry { source_text: source.to_string(), target_text: target.to_string(), law: None, domain: None, year: None, entry_id: None }
    }

    #[tokio::test]
    async fn run_stage1_dedups_terms_across_micro_batches() {
        let stub = StubLlmClient::new().with_default(hte_llm::ChatResponse {
            content: serde_json::json!({"results": [[{"source_term": "合同", "target_term": "contract", "confidence": 0.9}]]}).to_string(),
            finish_reason: "stop".into(),
            ..Default::default()
        });
        let agent = BilingualExtractAgent::new(Arc::new(stub));

        let entries = vec![entry("合同双方", "the parties"), entry("合同条款", "the terms")];
        let terms = run_stage1(&agent, &entries, 1, 4).await;

        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].target_term, "contract");
    }
}
