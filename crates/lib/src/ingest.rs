//! # Index Building
//!
//! The offline, one-shot pipeline step that embeds a full chunk set and
//! writes it to the vector index. Rebuilding from the same document and
//! configuration produces the same content; prior content at the location is
//! cleared first rather than updated in place.

use crate::{
    errors::PromptError,
    index::{sql, IndexError, VectorIndex},
    providers::ai::Embedder,
    types::Chunk,
};
use futures::stream::{self, StreamExt, TryStreamExt};
use thiserror::Error;
use tracing::info;

/// How many chunks are embedded concurrently during an index build.
const EMBEDDING_CONCURRENCY: usize = 4;

/// Errors raised while building the index.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Index error: {0}")]
    Index(#[from] IndexError),
    #[error("Embedding generation failed: {0}")]
    Embedding(#[from] PromptError),
}

/// Embeds every chunk and stores the full set in `index`, replacing whatever
/// the index held before. Returns the number of chunks stored.
///
/// Each chunk's identifier is its position in `chunk_texts`, and all rows are
/// tagged with `source`. The embedding model id and dimensionality are
/// recorded in the index metadata so a later query with a different model can
/// be rejected. The index is flushed before returning.
pub async fn build_index(
    index: &VectorIndex,
    embedder: &dyn Embedder,
    chunk_texts: Vec<String>,
    source: &str,
) -> Result<usize, IngestError> {
    index.initialize_schema().await?;
    index.clear().await?;

    info!(
        "Embedding {} chunks with model '{}'.",
        chunk_texts.len(),
        embedder.model_id()
    );

    // Embed with bounded concurrency; `buffered` preserves input order.
    let embedded: Vec<(usize, String, Vec<f32>)> =
        stream::iter(chunk_texts.into_iter().enumerate())
            .map(|(sequence, content)| async move {
                let vector = embedder.embed(&content).await?;
                Ok::<_, PromptError>((sequence, content, vector))
            })
            .buffered(EMBEDDING_CONCURRENCY)
            .try_collect()
            .await?;

    index
        .put_meta(sql::META_EMBEDDING_MODEL, embedder.model_id())
        .await?;
    index.put_meta(sql::META_SOURCE, source).await?;

    if let Some((_, _, first_vector)) = embedded.first() {
        // Every stored vector must share the model's output dimensionality;
        // `insert_chunk` re-checks each row against this.
        index
            .put_meta(sql::META_EMBEDDING_DIM, &first_vector.len().to_string())
            .await?;
    }

    let mut stored = 0;
    for (sequence, content, vector) in embedded {
        let chunk = Chunk {
            source: source.to_string(),
            sequence,
            content,
        };
        index.insert_chunk(&chunk, &vector).await?;
        stored += 1;
    }

    index.flush().await?;
    info!("Stored {stored} embedded chunks for source '{source}'.");
    Ok(stored)
}
