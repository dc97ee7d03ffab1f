//! # Application State
//!
//! The shared state handed to every request handler: the conversation engine
//! plus the pieces the debug endpoints reach for directly. Everything is
//! constructed once at startup and passed in; there are no ambient globals.

use crate::config::Config;
use docbot::{
    chat::{ChatConfig, ChatEngine},
    history::HistoryStore,
    index::{index_db_path, VectorIndex},
    prompts::Persona,
    providers::ai::{AiProvider, ApiEmbedder, Embedder, LocalAiProvider},
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub engine: Arc<ChatEngine>,
    /// The open index handle, shared with the engine; used by `/retrieve`.
    pub index: VectorIndex,
    pub embedder: Arc<dyn Embedder>,
}

/// Builds the shared application state from the configuration.
///
/// Opens the vector index (an index that has never been built serves empty
/// retrievals rather than failing), wires up the embeddings and chat
/// providers, and assembles the `ChatEngine`.
pub async fn build_app_state(config: Config) -> anyhow::Result<AppState> {
    std::fs::create_dir_all(&config.index_dir)?;
    let db_path = index_db_path(Path::new(&config.index_dir));
    let index = VectorIndex::open(&db_path.to_string_lossy()).await?;
    index.initialize_schema().await?;
    info!(index = %db_path.display(), "Opened vector index.");

    let embedder: Arc<dyn Embedder> = Arc::new(ApiEmbedder::new(
        config.embeddings_api_url.clone(),
        config.embed_model.clone(),
        None,
    )?);

    let ai_provider: Arc<dyn AiProvider> = Arc::new(LocalAiProvider::new(
        config.ollama_api_url.clone(),
        None,
        Some(config.ollama_model.clone()),
    )?);
    info!(model = %config.ollama_model, "Using chat model.");

    let history = Arc::new(HistoryStore::new(&config.history_file));

    let source_name = Path::new(&config.pdf_path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| config.pdf_path.clone());

    let engine = ChatEngine::new(
        index.clone(),
        embedder.clone(),
        ai_provider,
        history,
        Persona::default(),
        ChatConfig {
            retrieval_k: config.retrieval_k,
            max_history_turns: config.max_history_turns,
            generation_timeout: Duration::from_secs(config.generation_timeout_secs),
            source_name,
            embedding_model: config.embed_model.clone(),
        },
    );

    Ok(AppState {
        config: Arc::new(config),
        engine: Arc::new(engine),
        index,
        embedder,
    })
}
