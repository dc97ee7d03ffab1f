//! # Retrieval
//!
//! The online nearest-neighbor lookup: embed the question with the same model
//! the index was built with, then return the top-k closest chunks.

use crate::{
    errors::PromptError,
    index::{sql, IndexError, VectorIndex},
    providers::ai::Embedder,
    types::RetrievedChunk,
};
use thiserror::Error;
use tracing::{debug, info};

/// The default number of chunks retrieved per question.
pub const DEFAULT_RETRIEVAL_K: u32 = 3;

/// Errors raised during retrieval.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Index error: {0}")]
    Index(#[from] IndexError),
    #[error("Query embedding failed: {0}")]
    Embedding(#[from] PromptError),
    #[error("Index was built with embedding model '{indexed}' but the query uses '{requested}'")]
    ModelMismatch { indexed: String, requested: String },
}

/// Embeds `query` and returns the `k` most similar stored chunks, best match
/// first.
///
/// An index built with a different embedding model is rejected outright: a
/// silent mismatch would not fail, it would just return irrelevant chunks.
/// An empty (never built) index yields an empty result, not an error.
pub async fn retrieve(
    index: &VectorIndex,
    embedder: &dyn Embedder,
    query: &str,
    k: u32,
) -> Result<Vec<RetrievedChunk>, SearchError> {
    let Some(indexed_model) = index.get_meta(sql::META_EMBEDDING_MODEL).await? else {
        info!("Vector index has no content yet; returning no chunks.");
        return Ok(Vec::new());
    };

    if indexed_model != embedder.model_id() {
        return Err(SearchError::ModelMismatch {
            indexed: indexed_model,
            requested: embedder.model_id().to_string(),
        });
    }

    // The query vector is ephemeral: embedded once, searched once, dropped.
    let query_vector = embedder.embed(query).await?;
    let results = index.vector_search(query_vector, k).await?;

    debug!("Retrieved {} chunks for query.", results.len());
    Ok(results)
}
