//! # In-Memory Vector Store
//!
//! A brute-force cosine-distance store kept entirely in process memory.

use crate::{
    index::IndexError,
    providers::db::storage::{IndexEntry, VectorStore},
    types::ScoredDocument,
};
use async_trait::async_trait;
use std::{
    collections::HashSet,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tracing::debug;

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<Vec<IndexEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<IndexEntry>>, IndexError> {
        self.entries
            .read()
            .map_err(|_| IndexError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<IndexEntry>>, IndexError> {
        self.entries
            .write()
            .map_err(|_| IndexError::Unavailable("memory store lock poisoned".to_string()))
    }
}

/// Cosine distance (`1 - cosine similarity`). A zero vector is at distance 1.0 from everything.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[async_trait]
impl VectorStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn insert(&self, entries: Vec<IndexEntry>) -> Result<(), IndexError> {
        let mut stored = self.write()?;
        let expected = stored
            .first()
            .or_else(|| entries.first())
            .map(|e| e.embedding.len());
        if let Some(expected) = expected {
            if let Some(bad) = entries.iter().find(|e| e.embedding.len() != expected) {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    got: bad.embedding.len(),
                });
            }
        }
        stored.extend(entries);
        debug!(total = stored.len(), "Memory store updated");
        Ok(())
    }

    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredDocument>, IndexError> {
        let stored = self.read()?;
        if let Some(first) = stored.first() {
            if first.embedding.len() != query_vector.len() {
                return Err(IndexError::DimensionMismatch {
                    expected: first.embedding.len(),
                    got: query_vector.len(),
                });
            }
        }

        let mut scored: Vec<(f64, &IndexEntry)> = stored
            .iter()
            .map(|e| (cosine_distance(query_vector, &e.embedding), e))
            .collect();
        // `sort_by` is stable, so equal distances keep insertion order.
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(distance, e)| ScoredDocument {
                id: e.document.id,
                text: e.document.text.clone(),
                label: e.document.label.clone(),
                distance,
            })
            .collect())
    }

    async fn existing_ids(&self, ids: &[u64]) -> Result<Vec<u64>, IndexError> {
        let stored = self.read()?;
        let present: HashSet<u64> = stored.iter().map(|e| e.document.id).collect();
        Ok(ids.iter().copied().filter(|id| present.contains(id)).collect())
    }

    async fn clear(&self) -> Result<(), IndexError> {
        self.write()?.clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize, IndexError> {
        Ok(self.read()?.len())
    }
}
