//! Tokenization and similarity helpers shared by the TM index (BM25) and
//! the BTEP normalization validators.

/// True for characters in the CJK Unified Ideographs block, used to decide
/// whether a string should be tokenized character-by-character.
#[must_use]
pub fn is_cjk_char(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

#[must_use]
pub fn contains_cjk(s: &str) -> bool {
    s.chars().any(is_cjk_char)
}

/// Tokenize for BM25 indexing: character-split for CJK text, whitespace
/// split + lowercase otherwise.
#[must_use]
pub fn tokenize(s: &str) -> Vec<String> {
    if contains_cjk(s) {
        s.chars().filter(|c| !c.is_whitespace()).map(String::from).collect()
    } else {
        s.to_lowercase().split_whitespace().map(String::from).collect()
    }
}

/// Character-overlap ratio between two strings, in `[0, 1]`. Used by the
/// BTEP normalization validators for Chinese/Japanese terms, where overlap
/// is measured over the distinct character sets of `a` and `b`.
#[must_use]
pub fn char_overlap_ratio(a: &str, b: &str) -> f64 {
    use std::collections::HashSet;
    let set_a: HashSet<char> = a.chars().collect();
    let set_b: HashSet<char> = b.chars().collect();
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    if union == 0 { 0.0 } else { intersection as f64 / union as f64 }
}

/// Word-overlap ratio between two whitespace-tokenized strings, in `[0, 1]`.
#[must_use]
pub fn word_overlap_ratio(a: &str, b: &str) -> f64 {
    use std::collections::HashSet;
    let set_a: HashSet<String> = a.to_lowercase().split_whitespace().map(String::from).collect();
    let set_b: HashSet<String> = b.to_lowercase().split_whitespace().map(String::from).collect();
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    if union == 0 { 0.0 } else { intersection as f64 / union as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_cjk_by_character() {
        let toks = tokenize("合同双方");
        assert_eq!(toks, vec!["合", "同", "双", "方"]);
    }

    #[test]
    fn tokenizes_latin_by_whitespace_lowercased() {
        let toks = tokenize("The Parties Shall");
        assert_eq!(toks, vec!["the", "parties", "shall"]);
    }

    #[test]
    fn char_overlap_is_symmetric_and_bounded() {
        let r = char_overlap_ratio("合同法", "合同");
        assert!(r > 0.0 && r <= 1.0);
        assert_eq!(char_overlap_ratio("abc", "abc"), 1.0);
        assert_eq!(char_overlap_ratio("", "abc"), 0.0);
    }
}
