pub mod embedding;
pub mod hashing;
pub mod local;

use crate::{errors::PromptError, types::CompletionRequest};
use async_trait::async_trait;
use dyn_clone::DynClone;
pub use embedding::{Embedder, HttpEmbedder};
pub use hashing::HashingEmbedder;
pub use local::LocalAiProvider;
use std::fmt::Debug;

/// A trait for interacting with a chat-completion AI provider.
///
/// Implementations send exactly one request per call and return the text of the
/// first completion choice, unmodified.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, PromptError>;
}

dyn_clone::clone_trait_object!(AiProvider);
