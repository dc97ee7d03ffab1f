//! SQL statements for the vector index schema.

/// The chunk table. `id` is the chunk's position in the source chunk
/// sequence, stored as text; `embedding` holds the chunk's vector as a
/// little-endian `f32` BLOB.
pub const CREATE_CHUNKS_TABLE: &str = "CREATE TABLE IF NOT EXISTS chunks (
    id TEXT PRIMARY KEY,
    source TEXT NOT NULL,
    seq INTEGER NOT NULL,
    content TEXT NOT NULL,
    embedding BLOB
);";

/// Key/value metadata about the index itself: the embedding model that
/// produced the vectors, their dimensionality and the source document name.
pub const CREATE_INDEX_META_TABLE: &str = "CREATE TABLE IF NOT EXISTS index_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);";

/// All statements required to bring a fresh database up to the current
/// schema. Each is idempotent and safe to run on every startup.
pub const ALL_TABLE_CREATION_SQL: &[&str] = &[CREATE_CHUNKS_TABLE, CREATE_INDEX_META_TABLE];

/// Metadata key for the embedding model identifier.
pub const META_EMBEDDING_MODEL: &str = "embedding_model";
/// Metadata key for the embedding dimensionality.
pub const META_EMBEDDING_DIM: &str = "embedding_dim";
/// Metadata key for the indexed source document.
pub const META_SOURCE: &str = "source";
