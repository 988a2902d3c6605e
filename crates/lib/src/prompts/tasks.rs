//! # Task Prompts
//!
//! Default prompt templates. The server can override both through its configuration;
//! the user template must keep the `{context}` and `{prompt}` placeholders.

// --- Agronomist Answering ---
pub const AGRONOMIST_SYSTEM_PROMPT: &str =
    "You are an AI agronomist. Answer strictly using the provided context.";
pub const AGRONOMIST_USER_PROMPT: &str = "Context:\n{context}\n\nQuestion:\n{prompt}";
