use crate::model::{NormalizedTerm, QualityCheckedTerm};
use crate::normalize_agent::NormalizeAgent;
use crate::normalize_rules::{validate_cjk_normalization, validate_en_normalization};
use std::collections::HashMap;

const ZH_OVERLAP_THRESHOLD: f64 = 0.3;
const JA_OVERLAP_THRESHOLD: f64 = 0.3;
const EN_OVERLAP_THRESHOLD: f64 = 0.8;

/// Stage 3: merges duplicate `(source_term, target_term)` records (keeping
/// the top 3 by quality_score and unioning entry_ids), then normalizes
/// each side of each unique pair in `normalization_batch_size` chunks,
/// reverting to the original whenever the language validator rejects the
/// drift.
pub async fn run_stage3(agent: &NormalizeAgent, terms: Vec<QualityCheckedTerm>, language: &str, normalization_batch_size: usize) -> Vec<NormalizedTerm> {
    let merged = merge_duplicates(terms);
    let mut sorted = merged;
    sorted.sort_by(|a, b| a.term.source_term.cmp(&b.term.source_term));

    let (threshold, zh_instructions) = match language {
        "zh" => (ZH_OVERLAP_THRESHOLD, true),
        "ja" => (JA_OVERLAP_THRESHOLD, true),
        _ => (EN_OVERLAP_THRESHOLD, false),
    };

    let chunk_size = normalization_batch_size.max(1);
    let mut out = Vec::with_capacity(sorted.len());

    for chunk in sorted.chunks(chunk_size) {
        let sources: Vec<String> = chunk.iter().map(|t| t.term.source_term.clone()).collect();
        let targets: Vec<String> = chunk.iter().map(|t| t.term.target_term.clone()).collect();

        let source_instructions = if zh_instructions {
            "Simplify traditional characters, keep all particles, unify common synonyms' spelling, do not merge semantically different terms, normalize article/section references."
        } else {
            "Emit plural forms as singular/plural, convert inflected verbs to base form when verbal, preserve proper-noun capitalization, use American spelling."
        };
        let normalized_sources = agent.normalize_batch(&sources, language, source_instructions).await;
        let normalized_targets = agent.normalize_batch(&targets, "English", "normalize article/section references, preserve proper-noun capitalization").await;

        for ((term, normalized_source), normalized_target) in chunk.iter().zip(normalized_sources).zip(normalized_targets) {
            let accepted_source = if zh_instructions { validate_cjk_normalization(&term.term.source_term, &normalized_source, threshold) } else { true };
            let accepted_target = validate_en_normalization(&term.term.target_term, &normalized_target, threshold);

            out.push(NormalizedTerm {
                term: term.clone(),
                normalized_source: if accepted_source { normalized_source } else { term.term.source_term.clone() },
                normalized_target: if accepted_target { normalized_target } else { term.term.target_term.clone() },
            });
        }
    }

    dedup_by_normalized_pair(out)
}

fn merge_duplicates(terms: Vec<QualityCheckedTerm>) -> Vec<QualityCheckedTerm> {
    let mut groups: HashMap<(String, String), Vec<QualityCheckedTerm>> = HashMap::new();
    for term in terms {
        groups.entry((term.term.source_term.clone(), term.term.target_term.clone())).or_default().push(term);
    }

    let mut out = Vec::new();
    for (_, mut records) in groups {
        records.sort_by(|a, b| b.quality_score.partial_cmp(&a.quality_score).unwrap());
        records.truncate(3);

        let entry_ids: Vec<String> = records.iter().filter_map(|r| r.term.entry_id.clone()).collect();
        let mut merged = records[0].clone();
        if !entry_ids.is_empty() {
            let mut sorted_ids = entry_ids;
            sorted_ids.sort();
            sorted_ids.dedup();
            merged.term.entry_id = Some(sorted_ids.join(","));
        }
        out.push(merged);
    }
    out
}

fn dedup_by_normalized_pair(terms: Vec<NormalizedTerm>) -> Vec<NormalizedTerm> {
    let mut seen = std::collections::HashSet::new();
    terms.into_iter().filter(|t| seen.insert((t.normalized_source.clone(), t.normalized_target.clone()))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hte_agents::AttributedTerm;
    use hte_llm::StubLlmClient;
    use std::sync::Arc;

    fn qc_term(source: &str, target: &str, quality: f64, entry_id: &str) -> QualityCheckedTerm {
        QualityCheckedTerm {
            term: AttributedTerm {
                source_term: source.to_string(),
                target_term: target.to_string(),
                confidence: 0.8,
                category: None,
                source_context: None,
                target_context: None,
                law: None,
                domain: None,
                year: None,
                entry_id: Some(entry_id.to_string()),
            },
            quality_score: quality,
        }
    }

    #[tokio::test]
    async fn run_stage3_reverts_when_normalization_drifts_too_far() {
        let stub = StubLlmClient::new()
            .enqueue_json(serde_json::json!({ "normalized": ["刑事诉讼程序"] }))
            .enqueue_json(serde_json::json!({ "normalized": ["contract"] }));
        let agent = NormalizeAgent::new(Arc::new(stub));

        let terms = vec![qc_term("合同法", "contract", 0.9, "e1")];
        let result = run_stage3(&agent, terms, "zh", 10).await;

        assert_eq!(result[0].normalized_source, "合同法");
    }

    #[tokio::test]
    async fn run_stage3_merges_duplicate_pairs_and_unions_entry_ids() {
        let stub = StubLlmClient::new().with_default(hte_llm::ChatResponse {
            content: serde_json::json!({"normalized": ["合同法", "合同法"]}).to_string(),
            finish_reason: "stop".into(),
            ..Default::default()
        });
        let agent = NormalizeAgent::new(Arc::new(stub));

        let terms = vec![qc_term("合同法", "contract law", 0.9, "e1"), qc_term("合同法", "contract law", 0.7, "e2")];
        let result = run_stage3(&agent, terms, "zh", 10).await;

        assert_eq!(result.len(), 1);
        assert!(result[0].term.term.entry_id.as_deref().unwrap().contains("e1"));
        assert!(result[0].term.term.entry_id.as_deref().unwrap().contains("e2"));
    }
}
