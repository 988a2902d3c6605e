//! # Agronomist Gateway
//!
//! Answers open questions with retrieval-augmented generation: retrieve context, compose
//! the fixed two-message prompt and forward it to the chat-completion provider in a
//! single call.

use crate::{
    constants::{DEFAULT_LLM_MODEL, DEFAULT_LLM_TEMPERATURE, DEFAULT_TOP_K},
    errors::PromptError,
    index::IndexError,
    prompts::tasks::{AGRONOMIST_SYSTEM_PROMPT, AGRONOMIST_USER_PROMPT},
    providers::ai::AiProvider,
    retrieve::ContextRetriever,
    types::{ChatMessage, CompletionRequest},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Error, Debug)]
pub enum AskError {
    #[error("Context retrieval failed: {0}")]
    Retrieval(#[from] IndexError),
    #[error("LLM service unavailable: {0}")]
    Upstream(#[from] PromptError),
}

/// Sampling and prompt settings for the gateway.
#[derive(Debug, Clone)]
pub struct AgronomistSettings {
    pub model: String,
    pub temperature: f32,
    pub top_k: i64,
    pub system_prompt: String,
    /// Must contain the `{context}` and `{prompt}` placeholders.
    pub user_prompt: String,
}

impl Default for AgronomistSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_LLM_MODEL.to_string(),
            temperature: DEFAULT_LLM_TEMPERATURE,
            top_k: DEFAULT_TOP_K,
            system_prompt: AGRONOMIST_SYSTEM_PROMPT.to_string(),
            user_prompt: AGRONOMIST_USER_PROMPT.to_string(),
        }
    }
}

/// The answer to an open question, along with the context it was grounded on.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub text: String,
    pub context: String,
}

/// Builds the `[system, user]` message pair for a question and its context.
///
/// An empty context still yields a well-formed prompt.
pub fn compose_prompt(
    system_prompt: &str,
    user_template: &str,
    context: &str,
    question: &str,
) -> Vec<ChatMessage> {
    let user_prompt = user_template
        .replace("{context}", context)
        .replace("{prompt}", question);
    vec![ChatMessage::system(system_prompt), ChatMessage::user(user_prompt)]
}

/// Retrieval-augmented question answering over the knowledge base.
#[derive(Debug, Clone)]
pub struct Agronomist {
    retriever: ContextRetriever,
    ai_provider: Box<dyn AiProvider>,
    settings: AgronomistSettings,
}

impl Agronomist {
    pub fn new(
        retriever: ContextRetriever,
        ai_provider: Box<dyn AiProvider>,
        settings: AgronomistSettings,
    ) -> Self {
        Self {
            retriever,
            ai_provider,
            settings,
        }
    }

    pub fn retriever(&self) -> &ContextRetriever {
        &self.retriever
    }

    pub fn settings(&self) -> &AgronomistSettings {
        &self.settings
    }

    /// Answers `question` from the retrieved context with one LLM call.
    pub async fn ask(&self, question: &str) -> Result<Answer, AskError> {
        info!("[ask] received question: {question:?}");
        let context = self
            .retriever
            .retrieve_context(question, self.settings.top_k)
            .await?;

        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages: compose_prompt(
                &self.settings.system_prompt,
                &self.settings.user_prompt,
                &context,
                question,
            ),
            temperature: self.settings.temperature,
        };
        debug!(messages = ?request.messages, "--> Sending prompt to AI provider");

        let text = self.ai_provider.complete(&request).await.map_err(|e| {
            error!("[ask] LLM call failed: {e}");
            AskError::Upstream(e)
        })?;
        debug!("<-- Answer from AI: {}", &text);

        Ok(Answer { text, context })
    }
}
