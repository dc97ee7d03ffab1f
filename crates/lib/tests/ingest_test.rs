//! # Index Build Tests
//!
//! Exercises the offline pipeline end to end against an in-memory index and
//! a deterministic embedder.

mod common;

use anyhow::Result;
use common::MockEmbedder;
use docbot::index::{sql, IndexError, VectorIndex};
use docbot::ingest::{build_index, IngestError};
use docbot::search::retrieve;

fn sample_chunks() -> Vec<String> {
    vec![
        "Solar cells convert light into electricity.".to_string(),
        "An inverter turns DC power into AC power.".to_string(),
        "Panels degrade slowly over decades.".to_string(),
    ]
}

#[tokio::test]
async fn build_stores_every_chunk_with_metadata() -> Result<()> {
    let index = VectorIndex::open(":memory:").await?;
    let embedder = MockEmbedder::new();

    let stored = build_index(&index, &embedder, sample_chunks(), "solar.pdf").await?;

    assert_eq!(stored, 3);
    assert_eq!(index.count_chunks().await?, 3);
    assert_eq!(
        index.get_meta(sql::META_EMBEDDING_MODEL).await?.as_deref(),
        Some("mock-embedder")
    );
    assert_eq!(
        index.get_meta(sql::META_EMBEDDING_DIM).await?.as_deref(),
        Some("4")
    );
    assert_eq!(
        index.get_meta(sql::META_SOURCE).await?.as_deref(),
        Some("solar.pdf")
    );
    Ok(())
}

#[tokio::test]
async fn rebuilding_replaces_rather_than_duplicates() -> Result<()> {
    let index = VectorIndex::open(":memory:").await?;
    let embedder = MockEmbedder::new();

    build_index(&index, &embedder, sample_chunks(), "solar.pdf").await?;
    build_index(&index, &embedder, sample_chunks(), "solar.pdf").await?;

    assert_eq!(index.count_chunks().await?, 3);
    Ok(())
}

#[tokio::test]
async fn an_indexed_chunk_is_retrievable_by_its_own_text() -> Result<()> {
    let index = VectorIndex::open(":memory:").await?;
    let embedder = MockEmbedder::new();
    build_index(&index, &embedder, sample_chunks(), "solar.pdf").await?;

    // The deterministic embedder maps identical text to an identical vector,
    // so querying with a chunk's own text must put that chunk first.
    let results = retrieve(
        &index,
        &embedder,
        "An inverter turns DC power into AC power.",
        1,
    )
    .await?;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].sequence, 1);
    assert_eq!(results[0].source, "solar.pdf");
    assert!((1.0 - results[0].score).abs() < 1e-6);
    Ok(())
}

#[tokio::test]
async fn a_vector_of_the_wrong_dimension_fails_the_build() -> Result<()> {
    let index = VectorIndex::open(":memory:").await?;
    let embedder = MockEmbedder::new();
    // First chunk embeds at the fallback dimensionality (4); the second is
    // programmed with a 3-dimensional vector.
    embedder.add_vector(
        "An inverter turns DC power into AC power.",
        vec![1.0, 2.0, 3.0],
    );

    let err = build_index(&index, &embedder, sample_chunks(), "solar.pdf")
        .await
        .expect_err("mixed dimensionality must be rejected");

    assert!(matches!(
        err,
        IngestError::Index(IndexError::DimensionMismatch {
            expected: 4,
            got: 3
        })
    ));
    Ok(())
}

#[tokio::test]
async fn an_empty_chunk_set_builds_an_empty_index() -> Result<()> {
    let index = VectorIndex::open(":memory:").await?;
    let embedder = MockEmbedder::new();

    let stored = build_index(&index, &embedder, Vec::new(), "empty.pdf").await?;

    assert_eq!(stored, 0);
    assert_eq!(index.count_chunks().await?, 0);
    assert_eq!(index.get_meta(sql::META_EMBEDDING_DIM).await?, None);
    Ok(())
}
