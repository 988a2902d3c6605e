use thiserror::Error;

/// Errors raised while talking to an external AI service (chat completion or embeddings).
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("AI provider returned no completion choices")]
    EmptyCompletion,
    #[error("Embedding provider returned {got} vectors for {expected} inputs")]
    EmbeddingCountMismatch { expected: usize, got: usize },
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

impl PromptError {
    /// Whether the provider did not answer within the client timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, PromptError::AiRequest(e) if e.is_timeout())
    }
}
