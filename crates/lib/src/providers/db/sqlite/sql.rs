//! # SQLite Specific SQL Queries
//!
//! This module centralizes SQL query strings for the SQLite vector store.
//! This makes the core logic cleaner and isolates database-specific syntax.

/// `seq` is the rowid and records insertion order; it is the tie-breaker for equal distances.
pub const CREATE_KNOWLEDGE_EMBEDDINGS_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS knowledge_embeddings (
        seq INTEGER PRIMARY KEY,
        doc_id INTEGER NOT NULL,
        text TEXT NOT NULL,
        label TEXT NOT NULL,
        embedding BLOB NOT NULL
    );
";

pub const ALL_TABLE_CREATION_SQL: &[&str] = &[CREATE_KNOWLEDGE_EMBEDDINGS_TABLE_SQL];

pub const INSERT_EMBEDDING_SQL: &str =
    "INSERT INTO knowledge_embeddings (doc_id, text, label, embedding) VALUES (?, ?, ?, ?)";

pub const DELETE_ALL_EMBEDDINGS_SQL: &str = "DELETE FROM knowledge_embeddings";

pub const COUNT_EMBEDDINGS_SQL: &str = "SELECT COUNT(*) FROM knowledge_embeddings";

/// Byte length of one stored embedding; four bytes per `f32` component.
pub const STORED_EMBEDDING_BYTES_SQL: &str =
    "SELECT length(embedding) FROM knowledge_embeddings LIMIT 1";

/// Returns the query selecting which of `count` candidate ids already exist.
pub fn existing_doc_ids(count: usize) -> String {
    let placeholders = vec!["?"; count].join(", ");
    format!("SELECT doc_id FROM knowledge_embeddings WHERE doc_id IN ({placeholders})")
}

/// Returns the nearest-neighbour query for a query vector.
///
/// Turso's vector functions expect the vector as a string literal within the query.
pub fn nearest_neighbours(query_vector: &[f32], limit: usize) -> String {
    let vector_str = format!(
        "vector32('[{}]')",
        query_vector
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    format!(
        "SELECT doc_id, text, label, vector_distance_cos(embedding, {vector_str}) AS distance
         FROM knowledge_embeddings
         ORDER BY distance ASC, seq ASC
         LIMIT {limit};"
    )
}

/// Returns the query used for an all-zero query vector, which is at distance 1.0 from
/// every stored embedding. Rows come back in insertion order.
pub fn insertion_order(limit: usize) -> String {
    format!(
        "SELECT doc_id, text, label, 1.0 AS distance
         FROM knowledge_embeddings
         ORDER BY seq ASC
         LIMIT {limit};"
    )
}
