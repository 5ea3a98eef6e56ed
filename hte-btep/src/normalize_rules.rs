use hte_core::text::char_overlap_ratio;
use regex::Regex;
use std::sync::LazyLock;

static ZH_ARTICLE_REF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"第\s*\d+\s*条").unwrap());
static ZH_ARTICLE_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static EN_ARTICLE_REF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)article\s+\d+").unwrap());
static EN_ARTICLE_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Replaces the numeric component of a Chinese article/section reference
/// with `XX` (`第36条` -> `第XX条`), leaving non-reference text untouched.
#[must_use]
pub fn normalize_zh_structural_markers(term: &str) -> String {
    ZH_ARTICLE_REF.replace_all(term, |caps: &regex::Captures| ZH_ARTICLE_DIGITS.replace(&caps[0], "XX").to_string()).to_string()
}

/// Replaces `Article 36` -> `Article XX`, case-insensitively on the word
/// "article" but preserving its original casing.
#[must_use]
pub fn normalize_en_structural_markers(term: &str) -> String {
    EN_ARTICLE_REF.replace_all(term, |caps: &regex::Captures| EN_ARTICLE_DIGITS.replace(&caps[0], "XX").to_string()).to_string()
}

/// Accepts a Chinese (or Japanese) normalization only if the character
/// overlap with the original is at or above the threshold, or if both
/// forms reduce to the same structural-marker-normalized string.
#[must_use]
pub fn validate_cjk_normalization(original: &str, normalized: &str, threshold: f64) -> bool {
    if original == normalized {
        return true;
    }
    if normalize_zh_structural_markers(original) == normalize_zh_structural_markers(normalized) {
        return true;
    }
    char_overlap_ratio(original, normalized) >= threshold
}

/// English terms validate either by the singular/plural composite rule
/// (the normalized form is `singular/plural` and the original is one of
/// the two components, or vice versa), by structural-marker equivalence,
/// or by falling back to the same character-overlap floor used for CJK.
#[must_use]
pub fn validate_en_normalization(original: &str, normalized: &str, threshold: f64) -> bool {
    if original == normalized {
        return true;
    }
    if is_singular_plural_composite(normalized) && composite_contains(normalized, original) {
        return true;
    }
    if normalize_en_structural_markers(original) == normalize_en_structural_markers(normalized) {
        return true;
    }
    char_overlap_ratio(&original.to_lowercase(), &normalized.to_lowercase()) >= threshold
}

#[must_use]
pub fn is_singular_plural_composite(term: &str) -> bool {
    term.split('/').count() == 2
}

#[must_use]
pub fn composite_contains(composite: &str, candidate: &str) -> bool {
    composite.split('/').any(|part| part.eq_ignore_ascii_case(candidate))
}

/// Crude English verb/noun pluralization heuristic used only to build a
/// `singular/plural` composite when normalizing a bare plural form; this
/// is not a full morphological analyzer, just enough for common legal
/// terminology nouns.
#[must_use]
pub fn pluralize_en(singular: &str) -> String {
    if singular.ends_with('y') && !singular.ends_with("ay") && !singular.ends_with("ey") && !singular.ends_with("oy") {
        format!("{}ies", &singular[..singular.len() - 1])
    } else if singular.ends_with('s') || singular.ends_with("sh") || singular.ends_with("ch") || singular.ends_with('x') {
        format!("{singular}es")
    } else {
        format!("{singular}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_zh_structural_markers_replaces_article_number() {
        assert_eq!(normalize_zh_structural_markers("第36条"), "第XX条");
        assert_eq!(normalize_zh_structural_markers("违约责任"), "违约责任");
    }

    #[test]
    fn normalize_en_structural_markers_replaces_article_number() {
        assert_eq!(normalize_en_structural_markers("Article 36"), "Article XX");
    }

    #[test]
    fn validate_cjk_normalization_accepts_structural_marker_equivalence() {
        assert!(validate_cjk_normalization("第36条", "第40条", 0.9));
    }

    #[test]
    fn validate_cjk_normalization_rejects_low_overlap() {
        assert!(!validate_cjk_normalization("合同法", "刑事诉讼程序", 0.5));
    }

    #[test]
    fn validate_en_normalization_accepts_singular_plural_composite() {
        assert!(validate_en_normalization("party", "party/parties", 0.5));
        assert!(validate_en_normalization("parties", "party/parties", 0.5));
    }

    #[test]
    fn pluralize_en_handles_common_suffixes() {
        assert_eq!(pluralize_en("party"), "parties");
        assert_eq!(pluralize_en("contract"), "contracts");
        assert_eq!(pluralize_en("witness"), "witnesses");
    }
}
