//! The one-shot offline indexer: extract the source PDF, chunk it, embed
//! every chunk and write the vector index. Exits non-zero with a diagnostic
//! when the source document is unreadable.

use anyhow::Context;
use clap::Parser;
use docbot::chunk::{chunk_lines, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use docbot::index::{index_db_path, VectorIndex};
use docbot::ingest::build_index;
use docbot::providers::ai::ApiEmbedder;
use docbot_pdf::extract_lines;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Builds the vector index from a source PDF.
///
/// Every flag falls back to the same environment variable the server reads,
/// so a plain `indexer` run with a configured environment needs no arguments.
#[derive(Parser, Debug)]
#[command(name = "indexer")]
struct Args {
    /// The source PDF to index.
    #[arg(
        long,
        env = "RAG_PDF_PATH",
        default_value = "solarcell-basic-knowledge-SolarHub.pdf"
    )]
    pdf_path: PathBuf,

    /// The directory the vector index is written to.
    #[arg(long, env = "CHROMA_DIR", default_value = "./chroma_db")]
    index_dir: PathBuf,

    /// The embedding model identifier.
    #[arg(
        long,
        env = "EMBED_MODEL_NAME",
        default_value = "paraphrase-multilingual-MiniLM-L12-v2"
    )]
    embed_model: String,

    /// The OpenAI-compatible embeddings endpoint.
    #[arg(
        long,
        env = "EMBEDDINGS_API_URL",
        default_value = "http://localhost:11434/v1/embeddings"
    )]
    embeddings_api_url: String,

    /// Lines per chunk.
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Lines shared between consecutive chunks.
    #[arg(long, default_value_t = DEFAULT_CHUNK_OVERLAP)]
    overlap: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Extracting from {}…", args.pdf_path.display());
    let lines = extract_lines(&args.pdf_path).await?;
    info!("Extracted {} lines.", lines.len());

    let chunks = chunk_lines(&lines, args.chunk_size, args.overlap);
    info!("Created {} chunks.", chunks.len());

    std::fs::create_dir_all(&args.index_dir)
        .with_context(|| format!("failed to create {}", args.index_dir.display()))?;
    let db_path = index_db_path(&args.index_dir);
    let index = VectorIndex::open(&db_path.to_string_lossy()).await?;

    let embedder = ApiEmbedder::new(args.embeddings_api_url, args.embed_model, None)?;

    let source = args
        .pdf_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.pdf_path.display().to_string());

    let stored = build_index(&index, &embedder, chunks, &source).await?;
    info!("Vector index built at: {} ({stored} chunks).", db_path.display());

    Ok(())
}
