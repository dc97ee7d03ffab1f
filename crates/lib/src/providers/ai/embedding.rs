//! # Embeddings Provider
//!
//! Generates vector embeddings by calling an external, OpenAI-compatible
//! embeddings API (Ollama exposes one at `/v1/embeddings`).

use crate::{errors::PromptError, providers::ai::Embedder};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize, Debug)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize, Debug)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize, Debug)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// An [`Embedder`] backed by an OpenAI-compatible embeddings endpoint.
#[derive(Clone, Debug)]
pub struct ApiEmbedder {
    client: ReqwestClient,
    api_url: String,
    model: String,
    api_key: Option<String>,
}

impl ApiEmbedder {
    /// Creates a new `ApiEmbedder`.
    pub fn new(
        api_url: String,
        model: String,
        api_key: Option<String>,
    ) -> Result<Self, PromptError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(PromptError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            model,
            api_key,
        })
    }
}

#[async_trait]
impl Embedder for ApiEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, PromptError> {
        let request_body = EmbeddingRequest {
            model: &self.model,
            input: text,
        };
        debug!(payload = ?request_body, "--> Sending request to embeddings API");

        let mut request_builder = self.client.post(&self.api_url).json(&request_body);
        if let Some(key) = &self.api_key {
            request_builder = request_builder.bearer_auth(key);
        }

        let response = request_builder
            .send()
            .await
            .map_err(PromptError::AiRequest)?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PromptError::AiApi(error_text));
        }

        let embedding_response: EmbeddingResponse = response
            .json()
            .await
            .map_err(PromptError::AiDeserialization)?;

        embedding_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| PromptError::AiApi("Embeddings API returned no embeddings".to_string()))
    }
}
