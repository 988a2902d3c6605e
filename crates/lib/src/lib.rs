//! # AgroRAG
//!
//! This crate answers farm questions two ways: rule-based checks over a sensor
//! snapshot (`diagnosis`), and retrieval-augmented generation over an agricultural
//! knowledge base (`ingest` → `index` → `retrieve` → `agronomist`).
//!
//! External services sit behind traits in `providers`: `Embedder` for text
//! embeddings, `VectorStore` for nearest-neighbour storage and `AiProvider` for chat
//! completion. All of them are constructed once and injected, so every stage can be
//! exercised with stubs.

pub mod agronomist;
pub mod constants;
pub mod diagnosis;
pub mod errors;
pub mod index;
pub mod ingest;
pub mod prompts;
pub mod providers;
pub mod retrieve;
pub mod types;

pub use agronomist::{compose_prompt, Agronomist, AgronomistSettings, Answer, AskError};
pub use errors::PromptError;
pub use index::{EmbeddingIndex, IndexError};
pub use retrieve::ContextRetriever;
pub use types::{ChatMessage, CompletionRequest, Document, ScoredDocument};
