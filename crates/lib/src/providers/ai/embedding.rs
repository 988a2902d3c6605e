//! # Embeddings Provider
//!
//! This module defines the `Embedder` seam used by the embedding index and an
//! implementation that calls an external, OpenAI-compatible or Gemini embeddings API.

use crate::errors::PromptError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, time::Duration};
use tracing::debug;

/// Turns text into fixed-length vectors.
///
/// Implementations must be deterministic for a fixed model and must return exactly
/// one vector per input, in input order.
#[async_trait]
pub trait Embedder: Send + Sync + Debug + DynClone {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PromptError>;

    /// Embeds a single text.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, PromptError> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        match vectors.len() {
            1 => Ok(vectors.remove(0)),
            got => Err(PromptError::EmbeddingCountMismatch { expected: 1, got }),
        }
    }
}

dyn_clone::clone_trait_object!(Embedder);

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize, Debug)]
struct OpenAIEmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize, Debug)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
}

#[derive(Deserialize, Debug)]
struct OpenAIEmbeddingData {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

// --- Gemini-specific request and response structures ---

#[derive(Serialize, Debug)]
struct GeminiEmbeddingRequest<'a> {
    model: String,
    content: GeminiEmbeddingContent<'a>,
}

#[derive(Serialize, Debug)]
struct GeminiEmbeddingContent<'a> {
    parts: Vec<GeminiEmbeddingPart<'a>>,
}

#[derive(Serialize, Debug)]
struct GeminiEmbeddingPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
struct GeminiEmbeddingResponse {
    embedding: GeminiEmbeddingValue,
}

#[derive(Deserialize, Debug)]
struct GeminiEmbeddingValue {
    values: Vec<f32>,
}

/// An `Embedder` backed by a remote embeddings endpoint.
///
/// The wire format is picked from the URL: `...:embedContent` endpoints get one Gemini
/// call per text, everything else is treated as OpenAI-compatible and receives
/// the whole batch in a single request.
#[derive(Clone, Debug)]
pub struct HttpEmbedder {
    client: ReqwestClient,
    api_url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpEmbedder {
    pub fn new(
        api_url: String,
        model: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, PromptError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(PromptError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            model,
            api_key,
        })
    }

    fn is_gemini(&self) -> bool {
        self.api_url.ends_with(":embedContent")
    }

    async fn embed_openai(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PromptError> {
        let request_body = OpenAIEmbeddingRequest {
            model: &self.model,
            input: texts,
        };
        debug!(batch = texts.len(), "--> Sending request to OpenAI-compatible Embeddings API");
        let mut request_builder = self.client.post(&self.api_url).json(&request_body);
        if let Some(key) = &self.api_key {
            request_builder = request_builder.bearer_auth(key);
        }

        let response = request_builder
            .send()
            .await
            .map_err(PromptError::AiRequest)?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PromptError::AiApi(format!("{status}: {error_text}")));
        }

        let mut openai_response: OpenAIEmbeddingResponse = response
            .json()
            .await
            .map_err(PromptError::AiDeserialization)?;

        if openai_response.data.len() != texts.len() {
            return Err(PromptError::EmbeddingCountMismatch {
                expected: texts.len(),
                got: openai_response.data.len(),
            });
        }
        // Some servers return the batch out of order; `index` is authoritative when present.
        if openai_response.data.iter().all(|d| d.index.is_some()) {
            openai_response.data.sort_by_key(|d| d.index);
        }
        Ok(openai_response
            .data
            .into_iter()
            .map(|d| d.embedding)
            .collect())
    }

    async fn embed_gemini(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PromptError> {
        // Gemini requires the model name to be prefixed with "models/" in the payload.
        let gemini_model_name = if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        };

        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            let request_body = GeminiEmbeddingRequest {
                model: gemini_model_name.clone(),
                content: GeminiEmbeddingContent {
                    parts: vec![GeminiEmbeddingPart { text }],
                },
            };
            let mut request_builder = self.client.post(&self.api_url).json(&request_body);
            if let Some(key) = &self.api_key {
                request_builder = request_builder.header("x-goog-api-key", key);
            }

            let response = request_builder
                .send()
                .await
                .map_err(PromptError::AiRequest)?;
            let status = response.status();
            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_default();
                return Err(PromptError::AiApi(format!("{status}: {error_text}")));
            }
            let gemini_response: GeminiEmbeddingResponse = response
                .json()
                .await
                .map_err(PromptError::AiDeserialization)?;
            vectors.push(gemini_response.embedding.values);
        }
        Ok(vectors)
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PromptError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if self.is_gemini() {
            self.embed_gemini(texts).await
        } else {
            self.embed_openai(texts).await
        }
    }
}
