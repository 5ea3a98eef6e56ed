use sha2::{Digest, Sha256};

/// Stable identity hash for a translation-memory entry: a hex digest of
/// `source_lang:target_lang:source_text:target_text`, truncated to 32 hex
/// characters (128 bits) — enough collision resistance for a corpus of
/// legal sentence pairs while staying short in the BM25/Milvus id column.
#[must_use]
pub fn tm_entry_id(source_lang: &str, target_lang: &str, source_text: &str, target_text: &str) -> String {
    let payload = format!("{source_lang}:{target_lang}:{source_text}:{target_text}");
    let digest = Sha256::digest(payload.as_bytes());
    hex::encode(digest)[..32].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_produce_same_id() {
        let a = tm_entry_id("zh", "en", "合同", "contract");
        let b = tm_entry_id("zh", "en", "合同", "contract");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn different_inputs_produce_different_ids() {
        let a = tm_entry_id("zh", "en", "合同", "contract");
        let b = tm_entry_id("zh", "en", "合同", "agreement");
        assert_ne!(a, b);
    }
}
