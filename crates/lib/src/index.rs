//! # Embedding Index
//!
//! `EmbeddingIndex` pairs an `Embedder` with a `VectorStore`. Either side can be swapped
//! (another embedding model, another storage backend) without touching callers.
//!
//! Ingestion and queries are serialized through a read/write gate: any number of
//! queries run in parallel, while `ingest` and `rebuild` hold the gate exclusively so a
//! query never observes a half-written batch.

use crate::{
    errors::PromptError,
    providers::{
        ai::Embedder,
        db::storage::{IndexEntry, VectorStore},
    },
    types::{Document, ScoredDocument},
};
use std::{collections::HashSet, sync::Arc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Custom error types for the embedding index.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Result count must be positive, got {0}")]
    InvalidK(i64),
    #[error("Vector index unavailable: {0}")]
    Unavailable(String),
    #[error("Embedding generation failed: {0}")]
    Embedding(#[from] PromptError),
    #[error("Document with ID {0} is already indexed")]
    DuplicateId(u64),
    #[error("Embedding dimension mismatch: index holds {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

impl From<turso::Error> for IndexError {
    fn from(err: turso::Error) -> Self {
        IndexError::Unavailable(err.to_string())
    }
}

/// A semantic index over knowledge-base documents.
#[derive(Debug)]
pub struct EmbeddingIndex {
    embedder: Box<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    gate: RwLock<()>,
}

impl EmbeddingIndex {
    pub fn new(embedder: Box<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            store,
            gate: RwLock::new(()),
        }
    }

    /// Name of the storage backend, for logging.
    pub fn backend(&self) -> &str {
        self.store.name()
    }

    /// Embeds `documents` in one batch and appends them to the store.
    ///
    /// Fails with `IndexError::DuplicateId` without writing anything if any id is
    /// already indexed or repeated within the batch.
    pub async fn ingest(&self, documents: &[Document]) -> Result<(), IndexError> {
        let _guard = self.gate.write().await;
        self.ingest_locked(documents).await
    }

    /// Clears the store, then ingests `documents`. Running it twice with the same
    /// documents leaves the index in the same state.
    pub async fn rebuild(&self, documents: &[Document]) -> Result<(), IndexError> {
        let _guard = self.gate.write().await;
        self.store.clear().await?;
        self.ingest_locked(documents).await
    }

    async fn ingest_locked(&self, documents: &[Document]) -> Result<(), IndexError> {
        if documents.is_empty() {
            return Ok(());
        }

        let mut seen = HashSet::with_capacity(documents.len());
        if let Some(dup) = documents.iter().find(|d| !seen.insert(d.id)) {
            return Err(IndexError::DuplicateId(dup.id));
        }
        let ids: Vec<u64> = documents.iter().map(|d| d.id).collect();
        if let Some(existing) = self.store.existing_ids(&ids).await?.first() {
            return Err(IndexError::DuplicateId(*existing));
        }

        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != documents.len() {
            return Err(PromptError::EmbeddingCountMismatch {
                expected: documents.len(),
                got: vectors.len(),
            }
            .into());
        }

        let entries = documents
            .iter()
            .cloned()
            .zip(vectors)
            .map(|(document, embedding)| IndexEntry {
                document,
                embedding,
            })
            .collect();
        self.store.insert(entries).await?;
        info!(
            count = documents.len(),
            backend = self.store.name(),
            "Ingested documents into embedding index"
        );
        Ok(())
    }

    /// Returns up to `k` documents nearest to `text`, nearest first.
    ///
    /// Ties are broken by insertion order. An empty index yields an empty result.
    pub async fn query(&self, text: &str, k: i64) -> Result<Vec<ScoredDocument>, IndexError> {
        if k <= 0 {
            return Err(IndexError::InvalidK(k));
        }
        let _guard = self.gate.read().await;
        if self.store.count().await? == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed_one(text).await?;
        let results = self.store.search(&query_vector, k as usize).await?;
        debug!(k, hits = results.len(), "Embedding index query complete");
        Ok(results)
    }

    /// Number of indexed documents.
    pub async fn len(&self) -> Result<usize, IndexError> {
        let _guard = self.gate.read().await;
        self.store.count().await
    }

    pub async fn is_empty(&self) -> Result<bool, IndexError> {
        Ok(self.len().await? == 0)
    }
}
