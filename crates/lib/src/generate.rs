//! # Answer Generation
//!
//! Wraps the chat-model call with a bounded wait and turns an empty
//! completion into an observable sentinel instead of a silent blank reply.

use crate::{errors::PromptError, providers::ai::AiProvider};
use std::time::Duration;
use thiserror::Error;

/// Substituted when the model returns no usable text.
pub const EMPTY_GENERATION_SENTINEL: &str = "[ERROR] Empty response from LLM.";

/// Errors raised while generating an answer.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Language model call failed: {0}")]
    Llm(#[from] PromptError),
    #[error("Language model did not answer within {0:?}")]
    Timeout(Duration),
}

/// Sends `prompt` to the model and returns its trimmed completion.
///
/// The call is given at most `timeout`; an overrun is reported as an error
/// rather than blocking the message pipeline forever. An empty completion
/// becomes [`EMPTY_GENERATION_SENTINEL`].
pub async fn generate_answer(
    provider: &dyn AiProvider,
    prompt: &str,
    timeout: Duration,
) -> Result<String, GenerationError> {
    let raw = tokio::time::timeout(timeout, provider.generate(prompt))
        .await
        .map_err(|_| GenerationError::Timeout(timeout))??;

    let answer = raw.trim();
    if answer.is_empty() {
        return Ok(EMPTY_GENERATION_SENTINEL.to_string());
    }
    Ok(answer.to_string())
}
