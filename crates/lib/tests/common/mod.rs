//! Shared test doubles for the integration tests: a chat provider and an
//! embedder that record their calls and never touch the network.

// Each integration test binary compiles its own copy of this module and
// uses a different subset of it.
#![allow(dead_code)]

use async_trait::async_trait;
use docbot::errors::PromptError;
use docbot::providers::ai::{AiProvider, Embedder};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A chat provider that returns a pre-programmed response and records every
/// prompt it receives. With no response programmed it fails, which is how
/// the error-path tests drive the apology reply.
#[derive(Clone, Debug, Default)]
pub struct MockAiProvider {
    response: Arc<Mutex<Option<String>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_response(&self, response: &str) {
        *self.response.lock().unwrap() = Some(response.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, PromptError> {
        self.calls.lock().unwrap().push(prompt.to_string());
        match self.response.lock().unwrap().clone() {
            Some(response) => Ok(response),
            None => Err(PromptError::AiApi(
                "MockAiProvider: no response programmed".to_string(),
            )),
        }
    }
}

/// A chat provider that takes longer than any test timeout to answer.
#[derive(Clone, Debug)]
pub struct SlowAiProvider {
    pub delay: Duration,
}

#[async_trait]
impl AiProvider for SlowAiProvider {
    async fn generate(&self, _prompt: &str) -> Result<String, PromptError> {
        tokio::time::sleep(self.delay).await;
        Ok("too late".to_string())
    }
}

/// A deterministic, in-process embedder.
///
/// Specific vectors can be programmed per input; anything else falls back to
/// a stable function of the text's bytes, so identical texts always embed
/// identically without any programming.
#[derive(Clone, Debug)]
pub struct MockEmbedder {
    model: String,
    vectors: Arc<Mutex<HashMap<String, Vec<f32>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::with_model("mock-embedder")
    }

    pub fn with_model(model: &str) -> Self {
        Self {
            model: model.to_string(),
            vectors: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn add_vector(&self, text: &str, vector: Vec<f32>) {
        self.vectors
            .lock()
            .unwrap()
            .insert(text.to_string(), vector);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn fallback_vector(text: &str) -> Vec<f32> {
        let bytes = text.as_bytes();
        let sum: u32 = bytes.iter().map(|b| u32::from(*b)).sum();
        let first = f32::from(*bytes.first().unwrap_or(&1));
        let last = f32::from(*bytes.last().unwrap_or(&1));
        vec![(sum % 101) as f32 + 1.0, bytes.len() as f32 + 1.0, first, last]
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, PromptError> {
        self.calls.lock().unwrap().push(text.to_string());
        let programmed = self.vectors.lock().unwrap().get(text).cloned();
        Ok(programmed.unwrap_or_else(|| Self::fallback_vector(text)))
    }
}
