use crate::{
    index::IndexError,
    providers::db::storage::{IndexEntry, VectorStore},
    types::ScoredDocument,
};
use async_trait::async_trait;
use std::fmt::{self, Debug};
use tracing::{debug, info, warn};
use turso::{Connection, Database, Value as TursoValue};

pub mod sql;

/// Largest number of bound parameters used in a single `IN (...)` lookup.
const ID_LOOKUP_CHUNK: usize = 500;

/// A persistent vector store on top of a local SQLite database using Turso.
///
/// When cloned, it shares the same underlying database, so one file or in-memory
/// instance can back several handles.
#[derive(Clone)]
pub struct SqliteStore {
    /// The Turso database instance. It's cloneable and thread-safe.
    pub db: Database,
}

impl SqliteStore {
    /// Opens (or creates) the database at `db_path` and makes sure the schema exists.
    ///
    /// Use ":memory:" for an isolated in-memory database.
    pub async fn new(db_path: &str) -> Result<Self, IndexError> {
        let db = turso::Builder::new_local(db_path).build().await?;
        let store = Self { db };
        store.initialize_schema().await?;
        info!(db_path = %db_path, "Initialized SQLite vector store.");
        Ok(store)
    }

    /// Ensures that all required tables exist. Idempotent.
    pub async fn initialize_schema(&self) -> Result<(), IndexError> {
        let conn = self.db.connect()?;
        for statement in sql::ALL_TABLE_CREATION_SQL {
            conn.execute(statement, ()).await?;
        }
        Ok(())
    }

    async fn stored_dimensions(&self, conn: &Connection) -> Result<Option<usize>, IndexError> {
        let mut rows = conn.query(sql::STORED_EMBEDDING_BYTES_SQL, ()).await?;
        match rows.next().await? {
            Some(row) => match row.get_value(0)? {
                TursoValue::Integer(bytes) => Ok(Some(bytes as usize / 4)),
                _ => Ok(None),
            },
            None => Ok(None),
        }
    }

    async fn insert_all(
        &self,
        conn: &Connection,
        entries: Vec<IndexEntry>,
    ) -> Result<(), IndexError> {
        for entry in entries {
            let bytes: Vec<u8> = entry
                .embedding
                .iter()
                .flat_map(|f| f.to_le_bytes())
                .collect();
            let params = vec![
                TursoValue::Integer(entry.document.id as i64),
                TursoValue::Text(entry.document.text),
                TursoValue::Text(entry.document.label),
                TursoValue::Blob(bytes),
            ];
            conn.execute(sql::INSERT_EMBEDDING_SQL, params).await?;
        }
        Ok(())
    }
}

impl Debug for SqliteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl VectorStore for SqliteStore {
    fn name(&self) -> &str {
        "SQLite"
    }

    async fn insert(&self, entries: Vec<IndexEntry>) -> Result<(), IndexError> {
        if entries.is_empty() {
            return Ok(());
        }
        let conn = self.db.connect()?;

        let expected = match self.stored_dimensions(&conn).await? {
            Some(dims) => dims,
            None => entries[0].embedding.len(),
        };
        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != expected) {
            return Err(IndexError::DimensionMismatch {
                expected,
                got: bad.embedding.len(),
            });
        }

        let total = entries.len();
        // One transaction per batch so a failed ingest leaves no partial rows behind.
        conn.execute("BEGIN", ()).await?;
        if let Err(e) = self.insert_all(&conn, entries).await {
            if let Err(rollback) = conn.execute("ROLLBACK", ()).await {
                warn!("Rollback after failed insert also failed: {rollback}");
            }
            return Err(e);
        }
        conn.execute("COMMIT", ()).await?;

        debug!(inserted = total, "SQLite vector store updated");
        Ok(())
    }

    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredDocument>, IndexError> {
        let conn = self.db.connect()?;
        match self.stored_dimensions(&conn).await? {
            None => return Ok(Vec::new()),
            Some(expected) if expected != query_vector.len() => {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    got: query_vector.len(),
                })
            }
            Some(_) => {}
        }

        let sql = if query_vector.iter().all(|x| *x == 0.0) {
            sql::insertion_order(limit)
        } else {
            sql::nearest_neighbours(query_vector, limit)
        };
        debug!("Executing SQLite vector search query.");
        let mut rows = conn.query(&sql, ()).await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            let id = match row.get_value(0)? {
                TursoValue::Integer(i) => i as u64,
                _ => continue,
            };
            let text = match row.get_value(1)? {
                TursoValue::Text(s) => s,
                _ => String::new(),
            };
            let label = match row.get_value(2)? {
                TursoValue::Text(s) => s,
                _ => String::new(),
            };
            let distance = match row.get_value(3)? {
                TursoValue::Real(f) => f,
                TursoValue::Integer(i) => i as f64,
                _ => 1.0,
            };
            results.push(ScoredDocument {
                id,
                text,
                label,
                distance,
            });
        }
        Ok(results)
    }

    async fn existing_ids(&self, ids: &[u64]) -> Result<Vec<u64>, IndexError> {
        let conn = self.db.connect()?;
        let mut found = Vec::new();
        for chunk in ids.chunks(ID_LOOKUP_CHUNK) {
            let params: Vec<TursoValue> = chunk
                .iter()
                .map(|id| TursoValue::Integer(*id as i64))
                .collect();
            let mut rows = conn.query(&sql::existing_doc_ids(chunk.len()), params).await?;
            while let Some(row) = rows.next().await? {
                if let TursoValue::Integer(id) = row.get_value(0)? {
                    found.push(id as u64);
                }
            }
        }
        Ok(found)
    }

    async fn clear(&self) -> Result<(), IndexError> {
        let conn = self.db.connect()?;
        conn.execute(sql::DELETE_ALL_EMBEDDINGS_SQL, ()).await?;
        Ok(())
    }

    async fn count(&self) -> Result<usize, IndexError> {
        let conn = self.db.connect()?;
        let mut rows = conn.query(sql::COUNT_EMBEDDINGS_SQL, ()).await?;
        match rows.next().await? {
            Some(row) => match row.get_value(0)? {
                TursoValue::Integer(n) => Ok(n as usize),
                _ => Ok(0),
            },
            None => Ok(0),
        }
    }
}
