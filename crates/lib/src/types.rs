use serde::{Deserialize, Serialize};

/// A contiguous window of source lines, the unit of indexing and retrieval.
///
/// Chunks are created once during the offline indexing run and never mutated;
/// a re-index replaces the whole set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The source document this chunk was cut from (its file name).
    pub source: String,
    /// The chunk's position in the original chunk sequence. Doubles as its
    /// stable identifier in the index, stored as a string.
    pub sequence: usize,
    /// The window's lines joined with line breaks.
    pub content: String,
}

impl Chunk {
    /// The chunk's identifier in the index.
    pub fn id(&self) -> String {
        self.sequence.to_string()
    }
}

/// One chunk returned by a similarity search, best matches first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub source: String,
    pub sequence: usize,
    pub content: String,
    /// Cosine similarity to the query, in `[0.0, 1.0]`, higher is closer.
    pub score: f64,
}
