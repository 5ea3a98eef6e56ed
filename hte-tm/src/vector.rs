use crate::model::TmEntry;
use async_trait::async_trait;
use hte_core::HteError;

/// Pluggable vector-store backend, generalized the way the reference kit's
/// RAG crate abstracts LanceDB/SurrealDB behind one trait per backend.
/// `MilvusHttpBackend` is the production implementation; tests use an
/// in-memory fake that implements cosine similarity directly.
#[async_trait]
pub trait VectorBackend: Send + Sync {
    async fn is_connected(&self) -> bool;

    async fn upsert(&self, entry: &TmEntry) -> Result<(), HteError>;

    async fn upsert_batch(&self, entries: &[TmEntry]) -> Result<(), HteError>;

    async fn search(&self, query_vector: &[f32], source_lang: Option<&str>, target_lang: Option<&str>, top_k: usize) -> Result<Vec<(TmEntry, f64)>, HteError>;
}

/// Milvus collection configuration: `{id, vector(D), text, source_lang,
/// target_lang, domain, created_at}`, cosine index `IVF_FLAT(nlist=128)`,
/// search `nprobe=10`, reached over Milvus's REST proxy since no
/// maintained native Rust client exists in this ecosystem.
#[derive(Debug, Clone)]
pub struct MilvusConfig {
    pub base_url: String,
    pub collection: String,
    pub dimension: usize,
}

impl MilvusConfig {
    pub fn from_env() -> Result<Self, HteError> {
        let dimension = std::env::var("EMBEDDING_DIM")
            .map_err(|_| HteError::Config("EMBEDDING_DIM must be set before creating a Milvus collection".to_string()))?
            .parse::<usize>()
            .map_err(|_| HteError::Config("EMBEDDING_DIM must be a positive integer".to_string()))?;
        let host = std::env::var("MILVUS_HOST").unwrap_or_else(|_| "localhost".to_string());
        let port = std::env::var("MILVUS_PORT").unwrap_or_else(|_| "19530".to_string());
        let collection = std::env::var("TM_COLLECTION").unwrap_or_else(|_| "translation_memory".to_string());
        Ok(Self { base_url: format!("http://{host}:{port}"), collection, dimension })
    }
}

pub struct MilvusHttpBackend {
    http: reqwest::Client,
    config: MilvusConfig,
}

impl MilvusHttpBackend {
    #[must_use]
    pub fn new(config: MilvusConfig) -> Self {
        Self { http: reqwest::Client::new(), config }
    }
}

#[async_trait]
impl VectorBackend for MilvusHttpBackend {
    async fn is_connected(&self) -> bool {
        self.http
            .get(format!("{}/v1/vector/collections/describe", self.config.base_url))
            .query(&[("collectionName", self.config.collection.as_str())])
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn upsert(&self, entry: &TmEntry) -> Result<(), HteError> {
        self.upsert_batch(std::slice::from_ref(entry)).await
    }

    async fn upsert_batch(&self, entries: &[TmEntry]) -> Result<(), HteError> {
        let rows: Vec<_> = entries
            .iter()
            .filter_map(|e| {
                e.source_vector.as_ref().map(|vector| {
                    serde_json::json!({
                        "id": e.id,
                        "vector": vector,
                        "text": e.combined_text(),
                        "source_lang": e.source_lang,
                        "target_lang": e.target_lang,
                        "domain": e.domain.clone().unwrap_or_default(),
                        "created_at": chrono::Utc::now().timestamp(),
                    })
                })
            })
            .collect();
        if rows.is_empty() {
            return Ok(());
        }

        let body = serde_json::json!({ "collectionName": self.config.collection, "data": rows });
        let response = self
            .http
            .post(format!("{}/v1/vector/insert", self.config.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| HteError::Storage(format!("Milvus insert failed: {e}")))?;
        if !response.status().is_success() {
            return Err(HteError::Storage(format!("Milvus insert returned HTTP {}", response.status())));
        }
        Ok(())
    }

    async fn search(&self, query_vector: &[f32], source_lang: Option<&str>, target_lang: Option<&str>, top_k: usize) -> Result<Vec<(TmEntry, f64)>, HteError> {
        let mut filters = Vec::new();
        if let Some(lang) = source_lang {
            filters.push(format!("source_lang == \"{lang}\""));
        }
        if let Some(lang) = target_lang {
            filters.push(format!("target_lang == \"{lang}\""));
        }
        let filter_expr = filters.join(" && ");

        let body = serde_json::json!({
            "collectionName": self.config.collection,
            "vector": query_vector,
            "limit": top_k,
            "filter": filter_expr,
            "params": { "metric_type": "COSINE", "params": { "nprobe": 10 } },
        });
        let response = self
            .http
            .post(format!("{}/v1/vector/search", self.config.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| HteError::Storage(format!("Milvus search failed: {e}")))?;
        if !response.status().is_success() {
            return Err(HteError::Storage(format!("Milvus search returned HTTP {}", response.status())));
        }

        let parsed: serde_json::Value =
            response.json().await.map_err(|e| HteError::Storage(format!("invalid Milvus response: {e}")))?;

        let mut out = Vec::new();
        if let Some(rows) = parsed["data"].as_array() {
            for row in rows {
                let text = row["text"].as_str().unwrap_or_default();
                let Some((source_text, target_text)) = text.split_once("|||") else { continue };
                let mut entry = TmEntry::new(
                    source_text,
                    target_text,
                    row["source_lang"].as_str().unwrap_or_default(),
                    row["target_lang"].as_str().unwrap_or_default(),
                );
                entry.domain = row["domain"].as_str().map(String::from);
                let score = row["score"].as_f64().unwrap_or(0.0);
                out.push((entry, score));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milvus_config_requires_embedding_dim() {
        unsafe {
            std::env::remove_var("EMBEDDING_DIM");
        }
        let err = MilvusConfig::from_env().expect_err("should fail without EMBEDDING_DIM");
        assert!(matches!(err, HteError::Config(_)));
    }
}
