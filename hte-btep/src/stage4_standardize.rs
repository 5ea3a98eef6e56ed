use crate::model::{NormalizedTerm, StandardizedTerm};
use crate::normalize_rules::{composite_contains, is_singular_plural_composite, pluralize_en};
use std::collections::HashMap;

const DEFAULT_CONFIDENCE_WEIGHT: f64 = 0.4;
const DEFAULT_QUALITY_WEIGHT: f64 = 0.6;
const DEFAULT_MAX_TARGETS_PER_SOURCE: usize = 5;

pub struct StandardizeConfig {
    pub confidence_weight: f64,
    pub quality_weight: f64,
    pub max_targets_per_source: usize,
    pub source_lang: String,
    pub target_lang: String,
}

impl Default for StandardizeConfig {
    fn default() -> Self {
        Self {
            confidence_weight: DEFAULT_CONFIDENCE_WEIGHT,
            quality_weight: DEFAULT_QUALITY_WEIGHT,
            max_targets_per_source: DEFAULT_MAX_TARGETS_PER_SOURCE,
            source_lang: "zh".to_string(),
            target_lang: "en".to_string(),
        }
    }
}

/// Stage 4: folds duplicate `(normalized_source, normalized_target)`
/// records into one (merging entry_ids, keeping the highest combined
/// score, counting occurrences), merges singular/plural English target
/// variants within the same source, then caps each source to its top
/// `max_targets_per_source` targets by combined score.
pub fn run_stage4(terms: Vec<NormalizedTerm>, config: &StandardizeConfig) -> Vec<StandardizedTerm> {
    let folded = fold_duplicates(terms, config);
    let merged = merge_plural_variants(folded);
    cap_targets_per_source(merged, config.max_targets_per_source)
}

fn fold_duplicates(terms: Vec<NormalizedTerm>, config: &StandardizeConfig) -> Vec<StandardizedTerm> {
    let mut groups: HashMap<(String, String), Vec<NormalizedTerm>> = HashMap::new();
    for term in terms {
        groups.entry((term.normalized_source.clone(), term.normalized_target.clone())).or_default().push(term);
    }

    let mut out = Vec::with_capacity(groups.len());
    for ((normalized_source, normalized_target), records) in groups {
        let occurrence_count = records.len() as i64;
        let mut entry_ids: Vec<String> = records.iter().filter_map(|r| r.term.term.entry_id.clone()).collect();
        entry_ids.sort();
        entry_ids.dedup();

        let best = records
            .iter()
            .max_by(|a, b| combined_score(a, config).partial_cmp(&combined_score(b, config)).unwrap())
            .expect("group is non-empty");

        out.push(StandardizedTerm {
            normalized_source,
            normalized_target,
            source_lang: config.source_lang.clone(),
            target_lang: config.target_lang.clone(),
            confidence: best.term.term.confidence,
            quality_score: best.term.quality_score,
            combined_score: combined_score(best, config),
            category: best.term.term.category.clone(),
            domain: best.term.term.domain.clone(),
            law: best.term.term.law.clone(),
            year: best.term.term.year,
            occurrence_count,
            entry_id: if entry_ids.is_empty() { None } else { Some(entry_ids.join(",")) },
        });
    }
    out
}

fn combined_score(term: &NormalizedTerm, config: &StandardizeConfig) -> f64 {
    term.term.term.confidence * config.confidence_weight + term.term.quality_score * config.quality_weight
}

/// Within each `normalized_source` group, folds an English singular form
/// and its plural counterpart into a single `singular/plural` target when
/// both are present, summing their occurrence counts.
fn merge_plural_variants(terms: Vec<StandardizedTerm>) -> Vec<StandardizedTerm> {
    let mut by_source: HashMap<String, Vec<StandardizedTerm>> = HashMap::new();
    for term in terms {
        by_source.entry(term.normalized_source.clone()).or_default().push(term);
    }

    let mut out = Vec::new();
    for (_, mut group) in by_source {
        let mut merged_indices: Vec<bool> = vec![false; group.len()];

        for i in 0..group.len() {
            if merged_indices[i] {
                continue;
            }
            for j in (i + 1)..group.len() {
                if merged_indices[j] {
                    continue;
                }
                if is_plural_pair(&group[i].normalized_target, &group[j].normalized_target) {
                    let (singular, plural) = if group[i].normalized_target.len() <= group[j].normalized_target.len() {
                        (group[i].normalized_target.clone(), group[j].normalized_target.clone())
                    } else {
                        (group[j].normalized_target.clone(), group[i].normalized_target.clone())
                    };
                    group[i].normalized_target = format!("{singular}/{plural}");
                    group[i].occurrence_count += group[j].occurrence_count;
                    if group[j].combined_score > group[i].combined_score {
                        group[i].combined_score = group[j].combined_score;
                    }
                    merged_indices[j] = true;
                }
            }
        }

        for (idx, term) in group.into_iter().enumerate() {
            if !merged_indices[idx] {
                out.push(term);
            }
        }
    }
    out
}

fn is_plural_pair(a: &str, b: &str) -> bool {
    if is_singular_plural_composite(a) || is_singular_plural_composite(b) {
        return false;
    }
    pluralize_en(a).eq_ignore_ascii_case(b) || pluralize_en(b).eq_ignore_ascii_case(a) || composite_contains(&format!("{a}/{b}"), a)
}

fn cap_targets_per_source(terms: Vec<StandardizedTerm>, max_targets_per_source: usize) -> Vec<StandardizedTerm> {
    let limit = max_targets_per_source.max(1);
    let mut by_source: HashMap<String, Vec<StandardizedTerm>> = HashMap::new();
    for term in terms {
        by_source.entry(term.normalized_source.clone()).or_default().push(term);
    }

    let mut out = Vec::new();
    for (_, mut group) in by_source {
        group.sort_by(|a, b| b.combined_score.partial_cmp(&a.combined_score).unwrap());
        group.truncate(limit);
        out.extend(group);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QualityCheckedTerm;
    use hte_agents::AttributedTerm;

    fn normalized_term(source: &str, target: &str, confidence: f64, quality: f64, entry_id: &str) -> NormalizedTerm {
        NormalizedTerm {
            term: QualityCheckedTerm {
                term: AttributedTerm {
                    source_term: source.to_string(),
                    target_term: target.to_string(),
                    confidence,
                    category: None,
                    source_context: None,
                    target_context: None,
                    law: None,
                    domain: None,
                    year: None,
                    entry_id: Some(entry_id.to_string()),
                },
                quality_score: quality,
            },
            normalized_source: source.to_string(),
            normalized_target: target.to_string(),
        }
    }

    #[test]
    fn run_stage4_computes_combined_score_and_merges_duplicates() {
        let config = StandardizeConfig::default();
        let terms = vec![normalized_term("合同法", "contract law", 0.9, 0.8, "e1"), normalized_term("合同法", "contract law", 0.7, 0.6, "e2")];
        let result = run_stage4(terms, &config);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].occurrence_count, 2);
        assert!(result[0].entry_id.as_deref().unwrap().contains("e1"));
        assert!(result[0].entry_id.as_deref().unwrap().contains("e2"));
        let expected = 0.9 * DEFAULT_CONFIDENCE_WEIGHT + 0.8 * DEFAULT_QUALITY_WEIGHT;
        assert!((result[0].combined_score - expected).abs() < 1e-9);
    }

    #[test]
    fn run_stage4_merges_singular_plural_targets_within_same_source() {
        let config = StandardizeConfig::default();
        let terms = vec![normalized_term("当事人", "party", 0.9, 0.8, "e1"), normalized_term("当事人", "parties", 0.8, 0.7, "e2")];
        let result = run_stage4(terms, &config);

        assert_eq!(result.len(), 1);
        assert!(result[0].normalized_target.contains('/'));
    }

    #[test]
    fn run_stage4_caps_targets_per_source_by_combined_score() {
        let config = StandardizeConfig { max_targets_per_source: 1, ..StandardizeConfig::default() };
        let terms = vec![normalized_term("合同", "contract", 0.9, 0.9, "e1"), normalized_term("合同", "agreement", 0.5, 0.5, "e2")];
        let result = run_stage4(terms, &config);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].normalized_target, "contract");
    }
}
