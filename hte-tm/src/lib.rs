//! Hybrid BM25 + vector translation-memory index (C3).

pub mod bm25;
pub mod index;
pub mod model;
pub mod vector;

pub use bm25::Bm25Index;
pub use index::TmIndex;
pub use model::{TmEntry, TmMatch, TmStats};
pub use vector::{MilvusConfig, MilvusHttpBackend, VectorBackend};
