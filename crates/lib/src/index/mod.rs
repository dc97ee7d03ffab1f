//! # Vector Index
//!
//! A durable key → (vector, chunk text, metadata) store on top of a local
//! SQLite database managed by Turso. The offline indexer is the only writer;
//! at request time the index is read-only and safe for concurrent searches.

use crate::types::{Chunk, RetrievedChunk};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use turso::{params, Database, Value as TursoValue};

pub mod sql;

/// File name of the database inside the configured index directory.
pub const INDEX_DB_FILE: &str = "index.db";

/// The database path for an index stored under `dir`. The directory itself
/// is what configuration points at; its layout is owned here.
pub fn index_db_path(dir: &Path) -> PathBuf {
    dir.join(INDEX_DB_FILE)
}

/// Errors raised by the vector index.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Database error: {0}")]
    Database(#[from] turso::Error),
    #[error("Embedding dimension mismatch: index holds {expected}-dimensional vectors, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// A handle to the on-disk vector index.
///
/// Cloning shares the same underlying database, so one handle can be opened
/// at startup and passed to everything that needs it.
#[derive(Clone)]
pub struct VectorIndex {
    /// The Turso database instance. It's cloneable and thread-safe.
    pub db: Database,
}

impl VectorIndex {
    /// Opens (or creates) the index at `db_path`. Use `":memory:"` for an
    /// isolated in-memory index in tests.
    pub async fn open(db_path: &str) -> Result<Self, IndexError> {
        let db = turso::Builder::new_local(db_path).build().await?;

        // Enable WAL mode for better concurrency on file-based databases.
        // Use `query` for PRAGMA statements that return a value to avoid
        // "unexpected row" errors.
        let conn = db.connect()?;
        conn.query("PRAGMA journal_mode=WAL;", ()).await?;

        Ok(Self { db })
    }

    /// Ensures all required tables exist. Idempotent, safe on every startup.
    pub async fn initialize_schema(&self) -> Result<(), IndexError> {
        let conn = self.db.connect()?;
        for statement in sql::ALL_TABLE_CREATION_SQL {
            conn.execute(statement, ()).await?;
        }
        Ok(())
    }

    /// Deletes all stored chunks and metadata. A rebuild replaces the whole
    /// index content; there is no incremental update.
    pub async fn clear(&self) -> Result<(), IndexError> {
        let conn = self.db.connect()?;
        conn.execute("DELETE FROM chunks;", ()).await?;
        conn.execute("DELETE FROM index_meta;", ()).await?;
        info!("Cleared all prior index content.");
        Ok(())
    }

    /// Stores one chunk with its embedding.
    ///
    /// The vector's dimensionality must match whatever the index already
    /// holds (recorded in `index_meta`); a mismatch is rejected.
    pub async fn insert_chunk(&self, chunk: &Chunk, vector: &[f32]) -> Result<(), IndexError> {
        if let Some(dim) = self.get_meta(sql::META_EMBEDDING_DIM).await? {
            let expected: usize = dim.parse().unwrap_or(0);
            if expected != 0 && expected != vector.len() {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    got: vector.len(),
                });
            }
        }

        let conn = self.db.connect()?;
        // Convert &[f32] to &[u8] for BLOB storage.
        let vector_bytes: &[u8] =
            unsafe { std::slice::from_raw_parts(vector.as_ptr() as *const u8, vector.len() * 4) };

        conn.execute(
            "INSERT OR REPLACE INTO chunks (id, source, seq, content, embedding) VALUES (?, ?, ?, ?, ?)",
            params![
                chunk.id(),
                chunk.source.clone(),
                chunk.sequence as i64,
                chunk.content.clone(),
                vector_bytes
            ],
        )
        .await?;
        Ok(())
    }

    /// Writes one `index_meta` entry.
    pub async fn put_meta(&self, key: &str, value: &str) -> Result<(), IndexError> {
        let conn = self.db.connect()?;
        conn.execute(
            "INSERT OR REPLACE INTO index_meta (key, value) VALUES (?, ?)",
            params![key, value],
        )
        .await?;
        Ok(())
    }

    /// Reads one `index_meta` entry, `None` if absent.
    pub async fn get_meta(&self, key: &str) -> Result<Option<String>, IndexError> {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query("SELECT value FROM index_meta WHERE key = ?", params![key])
            .await?;
        if let Some(row) = rows.next().await? {
            if let Ok(TursoValue::Text(value)) = row.get_value(0) {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// The number of stored chunks.
    pub async fn count_chunks(&self) -> Result<u64, IndexError> {
        let conn = self.db.connect()?;
        let mut rows = conn.query("SELECT COUNT(*) FROM chunks;", ()).await?;
        if let Some(row) = rows.next().await? {
            if let Ok(TursoValue::Integer(n)) = row.get_value(0) {
                return Ok(n as u64);
            }
        }
        Ok(0)
    }

    /// Folds the WAL back into the main database file after a build.
    ///
    /// Committed writes are already durable in the WAL; a failed checkpoint
    /// only leaves them there, so it is logged rather than propagated.
    pub async fn flush(&self) -> Result<(), IndexError> {
        let conn = self.db.connect()?;
        if let Err(e) = conn.query("PRAGMA wal_checkpoint(TRUNCATE);", ()).await {
            warn!("WAL checkpoint failed: {e}");
        }
        Ok(())
    }

    /// Returns the `limit` chunks closest to `query_vector` by cosine
    /// similarity, best match first.
    ///
    /// Fewer stored chunks than `limit` returns them all; an empty index
    /// returns an empty vec. Read-only.
    pub async fn vector_search(
        &self,
        query_vector: Vec<f32>,
        limit: u32,
    ) -> Result<Vec<RetrievedChunk>, IndexError> {
        let conn = self.db.connect()?;

        let vector_str = format!(
            "vector('[{}]')",
            query_vector
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        // vector_distance_cos returns a distance in [0, 2]; fold it into a
        // similarity in [0, 1] so callers can sort descending.
        let sql = format!(
            "SELECT source, seq, content, (1.0 - (vector_distance_cos(embedding, {vector_str}) / 2.0)) AS similarity
             FROM chunks
             WHERE embedding IS NOT NULL
             ORDER BY similarity DESC
             LIMIT {limit};"
        );

        debug!(sql = %sql, "Executing vector search SQL");

        let mut results = conn.query(&sql, ()).await?;
        let mut retrieved = Vec::new();

        while let Some(row) = results.next().await? {
            let source = match row.get_value(0)? {
                TursoValue::Text(s) => s,
                _ => String::new(),
            };
            let sequence = match row.get_value(1)? {
                TursoValue::Integer(i) => i as usize,
                _ => 0,
            };
            let content = match row.get_value(2)? {
                TursoValue::Text(s) => s,
                _ => String::new(),
            };
            let score = match row.get_value(3)? {
                TursoValue::Real(f) => f,
                _ => 0.0,
            };
            retrieved.push(RetrievedChunk {
                source,
                sequence,
                content,
                score,
            });
        }

        Ok(retrieved)
    }
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex").finish_non_exhaustive()
    }
}
