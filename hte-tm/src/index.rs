use crate::bm25::Bm25Index;
use crate::model::{TmEntry, TmMatch, TmStats};
use crate::vector::VectorBackend;
use hte_core::HteError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

#[derive(Serialize, Deserialize)]
struct Bm25Snapshot {
    corpus: Vec<TmEntry>,
}

/// Hybrid translation-memory index (C3): an append-only BM25 corpus over
/// source text, plus an optional vector backend over source embeddings.
/// Both branches degrade gracefully when unavailable — a missing Milvus
/// backend disables the vector branch but leaves BM25 search intact.
pub struct TmIndex {
    bm25: RwLock<Bm25Index>,
    snapshot_path: Option<PathBuf>,
    vector_backend: Option<Arc<dyn VectorBackend>>,
}

impl TmIndex {
    #[must_use]
    pub fn new(vector_backend: Option<Arc<dyn VectorBackend>>) -> Self {
        Self { bm25: RwLock::new(Bm25Index::new()), snapshot_path: None, vector_backend }
    }

    #[must_use]
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    pub fn load_snapshot(path: impl AsRef<Path>, vector_backend: Option<Arc<dyn VectorBackend>>) -> Result<Self, HteError> {
        let raw = std::fs::read_to_string(&path).map_err(HteError::Io)?;
        let snapshot: Bm25Snapshot = serde_json::from_str(&raw).map_err(HteError::Serde)?;
        let mut bm25 = Bm25Index::new();
        bm25.add_entries(snapshot.corpus);
        Ok(Self {
            bm25: RwLock::new(bm25),
            snapshot_path: Some(path.as_ref().to_path_buf()),
            vector_backend,
        })
    }

    fn save_snapshot(&self) -> Result<(), HteError> {
        let Some(path) = &self.snapshot_path else { return Ok(()) };
        let corpus = self.bm25.read().unwrap().entries().to_vec();
        let snapshot = Bm25Snapshot { corpus };
        let raw = serde_json::to_string_pretty(&snapshot).map_err(HteError::Serde)?;
        std::fs::write(path, raw).map_err(HteError::Io)
    }

    /// Adds a single entry: BM25 corpus always, vector backend only when
    /// both a vector is supplied and the backend is connected. Saves a
    /// snapshot every 100 entries, matching the periodic-persist contract.
    pub async fn add_entry(&self, entry: TmEntry) -> Result<(), HteError> {
        if let (Some(backend), true) = (&self.vector_backend, entry.source_vector.is_some()) {
            backend.upsert(&entry).await?;
        }
        let len = {
            let mut bm25 = self.bm25.write().unwrap();
            bm25.add_entries(std::iter::once(entry));
            bm25.len()
        };
        if len % 100 == 0 {
            self.save_snapshot()?;
        }
        Ok(())
    }

    /// Batch insert: vectors go to Milvus in chunks of `batch_size`; all
    /// entries (vectored or not) are appended to the BM25 corpus, which is
    /// rebuilt once at the end and always snapshot-persisted.
    pub async fn batch_add_entries(&self, entries: Vec<TmEntry>, batch_size: usize) -> Result<(), HteError> {
        if let Some(backend) = &self.vector_backend {
            let vectored: Vec<TmEntry> = entries.iter().filter(|e| e.source_vector.is_some()).cloned().collect();
            for chunk in vectored.chunks(batch_size.max(1)) {
                backend.upsert_batch(chunk).await?;
            }
        }
        self.bm25.write().unwrap().add_entries(entries);
        self.save_snapshot()
    }

    #[must_use]
    pub fn search_bm25(&self, query: &str, source_lang: Option<&str>, target_lang: Option<&str>, top_k: usize) -> Vec<TmMatch> {
        self.bm25
            .read()
            .unwrap()
            .search(query, source_lang, target_lang, top_k)
            .into_iter()
            .map(|(entry, score)| to_match(entry, score))
            .collect()
    }

    pub async fn search_vector(&self, query_vector: &[f32], source_lang: Option<&str>, target_lang: Option<&str>, top_k: usize) -> Result<Vec<TmMatch>, HteError> {
        let Some(backend) = &self.vector_backend else { return Ok(Vec::new()) };
        let hits = backend.search(query_vector, source_lang, target_lang, top_k).await?;
        Ok(hits.into_iter().map(|(entry, score)| to_match(entry, score)).collect())
    }

    /// Runs both branches at `top_k*2`, merges by id summing weighted
    /// scores (an id present in only one branch keeps that branch's
    /// weighted score), sorts descending, truncates to `top_k`. Tolerant
    /// of either branch being empty or absent.
    pub async fn hybrid_search(
        &self,
        query: &str,
        query_vector: Option<&[f32]>,
        source_lang: Option<&str>,
        target_lang: Option<&str>,
        top_k: usize,
        w_bm25: f64,
        w_vec: f64,
    ) -> Result<Vec<TmMatch>, HteError> {
        let bm25_hits = self.search_bm25(query, source_lang, target_lang, top_k * 2);
        let vector_hits = if let Some(qv) = query_vector {
            self.search_vector(qv, source_lang, target_lang, top_k * 2).await?
        } else {
            Vec::new()
        };

        let mut merged: HashMap<String, TmMatch> = HashMap::new();
        for hit in bm25_hits {
            let entry = merged.entry(hit.id.clone()).or_insert_with(|| {
                let mut zero = hit.clone();
                zero.similarity_score = 0.0;
                zero
            });
            entry.similarity_score += hit.similarity_score * w_bm25;
        }
        for hit in vector_hits {
            let entry = merged.entry(hit.id.clone()).or_insert_with(|| {
                let mut zero = hit.clone();
                zero.similarity_score = 0.0;
                zero
            });
            entry.similarity_score += hit.similarity_score * w_vec;
        }

        let mut ranked: Vec<TmMatch> = merged.into_values().collect();
        ranked.sort_by(|a, b| b.similarity_score.partial_cmp(&a.similarity_score).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(top_k);
        Ok(ranked)
    }

    pub async fn get_stats(&self) -> TmStats {
        let bm25_len = self.bm25.read().unwrap().len();
        let milvus_available = match &self.vector_backend {
            Some(backend) => backend.is_connected().await,
            None => false,
        };
        TmStats { bm25_entries: bm25_len, bm25_available: true, milvus_available, milvus_entries: 0 }
    }
}

fn to_match(entry: TmEntry, score: f64) -> TmMatch {
    TmMatch {
        id: entry.id,
        source_text: entry.source_text,
        target_text: entry.target_text,
        similarity_score: score,
        context: entry.context,
        legal_domain: entry.domain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(source: &str, target: &str) -> TmEntry {
        TmEntry::new(source, target, "zh", "en")
    }

    #[tokio::test]
    async fn hybrid_search_degrades_to_bm25_only_without_vector_backend() {
        let index = TmIndex::new(None);
        index.batch_add_entries(vec![entry("合同双方应当遵守协议", "the parties shall comply")], 10).await.unwrap();

        let results = index.hybrid_search("合同", None, None, None, 5, 0.5, 0.5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].similarity_score > 0.0);
    }

    #[tokio::test]
    async fn hybrid_search_sums_weighted_scores_for_shared_ids() {
        let index = TmIndex::new(None);
        index.batch_add_entries(vec![entry("违约责任条款", "breach of contract liability")], 10).await.unwrap();

        let bm25_only = index.search_bm25("违约", None, None, 5);
        let hybrid = index.hybrid_search("违约", None, None, None, 5, 0.5, 0.5).await.unwrap();
        assert_eq!(bm25_only.len(), hybrid.len());
    }
}
