//! Shared stubs for the `agrorag` test suites: a recording chat provider and an
//! embedder with hand-assigned vectors.

use agrorag::{
    errors::PromptError,
    providers::{
        ai::{AiProvider, Embedder},
        db::memory::MemoryStore,
    },
    types::CompletionRequest,
    EmbeddingIndex,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// --- Mock AI Provider ---

/// How `MockAiProvider` answers a completion request.
#[derive(Clone, Debug)]
pub enum MockBehavior {
    /// Return the user message verbatim.
    Echo,
    /// Return a fixed reply.
    Reply(String),
    /// Fail as if the service were unreachable.
    Fail(String),
}

#[derive(Clone, Debug)]
pub struct MockAiProvider {
    behavior: MockBehavior,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockAiProvider {
    pub fn echo() -> Self {
        Self::with_behavior(MockBehavior::Echo)
    }

    pub fn replying(reply: &str) -> Self {
        Self::with_behavior(MockBehavior::Reply(reply.to_string()))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_behavior(MockBehavior::Fail(message.to_string()))
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Retrieves the recorded requests for assertion.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, PromptError> {
        self.calls.lock().unwrap().push(request.clone());
        match &self.behavior {
            MockBehavior::Echo => Ok(request
                .messages
                .iter()
                .rev()
                .find(|m| m.role == "user")
                .map(|m| m.content.clone())
                .unwrap_or_default()),
            MockBehavior::Reply(reply) => Ok(reply.clone()),
            MockBehavior::Fail(message) => Err(PromptError::AiApi(message.clone())),
        }
    }
}

// --- Stub Embedder ---

/// An embedder that returns hand-assigned vectors.
///
/// Unknown texts map to `fallback` so that a test only has to assign vectors to
/// the texts it cares about.
#[derive(Clone, Debug)]
pub struct StubEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
    calls: Arc<Mutex<usize>>,
}

impl StubEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            vectors: HashMap::new(),
            fallback: vec![0.0; dimensions],
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    /// Number of `embed` calls made so far (a batch counts once).
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PromptError> {
        *self.calls.lock().unwrap() += 1;
        Ok(texts
            .iter()
            .map(|t| self.vectors.get(t).cloned().unwrap_or_else(|| self.fallback.clone()))
            .collect())
    }
}

// --- Test Setup ---

/// Builds an in-memory index over the given embedder.
pub fn memory_index(embedder: impl Embedder + 'static) -> Arc<EmbeddingIndex> {
    Arc::new(EmbeddingIndex::new(
        Box::new(embedder),
        Arc::new(MemoryStore::new()),
    ))
}

/// A small two-crop knowledge base in file order.
pub fn sample_knowledge_base() -> Value {
    serde_json::json!({
        "tomato": { "N": 120, "K": 80, "ideal_ph": "6.0-6.8" },
        "lettuce": { "ideal_ec": "1.2-1.8 mS/cm", "ideal_temperature": "15-20°C" }
    })
}
