pub mod embedding;
pub mod local;

use crate::errors::PromptError;
use async_trait::async_trait;
use dyn_clone::DynClone;
pub use embedding::ApiEmbedder;
pub use local::LocalAiProvider;
use std::fmt::Debug;

/// A trait for interacting with a chat language model.
///
/// This defines the seam between the conversation pipeline and whichever
/// model actually answers (an Ollama instance, any OpenAI-compatible server,
/// or a mock in tests).
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Sends a fully assembled prompt to the model and returns its raw
    /// text completion.
    async fn generate(&self, prompt: &str) -> Result<String, PromptError>;
}

dyn_clone::clone_trait_object!(AiProvider);

/// A trait for turning text into a fixed-dimension vector.
///
/// The same embedder must be used at index-build time and at query time;
/// [`model_id`](Embedder::model_id) is persisted with the index so a mismatch
/// can be rejected instead of silently degrading relevance.
#[async_trait]
pub trait Embedder: Send + Sync + Debug + DynClone {
    /// The identifier of the underlying embedding model.
    fn model_id(&self) -> &str;

    /// Embeds a single piece of text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, PromptError>;
}

dyn_clone::clone_trait_object!(Embedder);
