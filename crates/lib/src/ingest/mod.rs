//! # Ingestion Logic
//!
//! This module turns the static agricultural knowledge base into flat documents
//! ready to be embedded.

pub mod knowledge;

pub use knowledge::{flatten, load_knowledge_base, KnowledgeError};
