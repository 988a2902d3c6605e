use crate::{
    index::IndexError,
    types::{Document, ScoredDocument},
};
use async_trait::async_trait;
use std::fmt::Debug;

/// A document together with its embedding, as handed to a `VectorStore`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub document: Document,
    pub embedding: Vec<f32>,
}

/// A trait for nearest-neighbour storage backends.
///
/// Stores only hold vectors; turning text into vectors is the job of the
/// `Embedder` owned by `EmbeddingIndex`. Every store ranks by cosine distance,
/// ascending, and breaks ties by insertion order.
#[async_trait]
pub trait VectorStore: Send + Sync + Debug {
    /// Returns the name of the backend (e.g., "memory", "SQLite").
    fn name(&self) -> &str;

    /// Appends entries in the given order.
    async fn insert(&self, entries: Vec<IndexEntry>) -> Result<(), IndexError>;

    /// Returns up to `limit` entries nearest to `query_vector`.
    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredDocument>, IndexError>;

    /// Returns the subset of `ids` already present in the store.
    async fn existing_ids(&self, ids: &[u64]) -> Result<Vec<u64>, IndexError>;

    /// Removes every entry.
    async fn clear(&self) -> Result<(), IndexError>;

    /// Number of stored entries (documents and vectors are always stored together).
    async fn count(&self) -> Result<usize, IndexError>;
}
