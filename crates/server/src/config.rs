//! # Server Configuration
//!
//! Everything is environment-driven: each knob has a default matching the
//! bundled sample deployment, and `.env` files are honored via `dotenvy` in
//! `main`.

use anyhow::Context;
use docbot::history::DEFAULT_MAX_HISTORY_TURNS;
use docbot::search::DEFAULT_RETRIEVAL_K;
use std::env;
use std::str::FromStr;

/// The fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// The port to listen on. `PORT`.
    pub port: u16,
    /// The source document the index was built from. `RAG_PDF_PATH`.
    pub pdf_path: String,
    /// The directory holding the vector index. `CHROMA_DIR`.
    pub index_dir: String,
    /// The embedding model identifier. `EMBED_MODEL_NAME`.
    pub embed_model: String,
    /// The OpenAI-compatible embeddings endpoint. `EMBEDDINGS_API_URL`.
    pub embeddings_api_url: String,
    /// How many chunks to retrieve per question. `RETRIEVAL_K`.
    pub retrieval_k: u32,
    /// The chat model identifier. `OLLAMA_MODEL`.
    pub ollama_model: String,
    /// The OpenAI-compatible chat completions endpoint. `OLLAMA_API_URL`.
    pub ollama_api_url: String,
    /// The per-user chat log file. `HISTORY_FILE`.
    pub history_file: String,
    /// How many prior turns to feed back into each prompt. `MAX_HISTORY_TURNS`.
    pub max_history_turns: usize,
    /// Bounded wait on the chat model, in seconds. `GENERATION_TIMEOUT_SECS`.
    pub generation_timeout_secs: u64,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// Loads the configuration from the environment, applying defaults for
/// anything unset.
pub fn get_config() -> anyhow::Result<Config> {
    Ok(Config {
        port: env_parse_or("PORT", 5000)?,
        pdf_path: env_or("RAG_PDF_PATH", "solarcell-basic-knowledge-SolarHub.pdf"),
        index_dir: env_or("CHROMA_DIR", "./chroma_db"),
        embed_model: env_or("EMBED_MODEL_NAME", "paraphrase-multilingual-MiniLM-L12-v2"),
        embeddings_api_url: env_or("EMBEDDINGS_API_URL", "http://localhost:11434/v1/embeddings"),
        retrieval_k: env_parse_or("RETRIEVAL_K", DEFAULT_RETRIEVAL_K)?,
        ollama_model: env_or("OLLAMA_MODEL", "gemma3:latest"),
        ollama_api_url: env_or(
            "OLLAMA_API_URL",
            "http://localhost:11434/v1/chat/completions",
        ),
        history_file: env_or("HISTORY_FILE", "chat_history.json"),
        max_history_turns: env_parse_or("MAX_HISTORY_TURNS", DEFAULT_MAX_HISTORY_TURNS)?,
        generation_timeout_secs: env_parse_or("GENERATION_TIMEOUT_SECS", 120)?,
    })
}
