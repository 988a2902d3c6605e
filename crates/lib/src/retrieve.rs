//! # Context Retrieval
//!
//! Builds the context block handed to the LLM from the nearest knowledge documents.

use crate::index::{EmbeddingIndex, IndexError};
use std::sync::Arc;
use tracing::debug;

/// Fetches the documents most relevant to a question and joins them into one block.
#[derive(Debug, Clone)]
pub struct ContextRetriever {
    index: Arc<EmbeddingIndex>,
}

impl ContextRetriever {
    pub fn new(index: Arc<EmbeddingIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &Arc<EmbeddingIndex> {
        &self.index
    }

    /// Returns the texts of the `k` nearest documents, nearest first, one per line.
    ///
    /// An empty index yields an empty string. Index failures are returned as errors
    /// and never collapse into an empty context.
    pub async fn retrieve_context(&self, question: &str, k: i64) -> Result<String, IndexError> {
        let hits = self.index.query(question, k).await?;
        debug!(hits = hits.len(), "Retrieved context documents");
        Ok(hits
            .into_iter()
            .map(|hit| hit.text)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
