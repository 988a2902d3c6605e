//! # Knowledge Base Flattening
//!
//! The knowledge base is a two-level JSON object: subject (e.g. a crop) → attribute →
//! fact. Each (subject, attribute) pair becomes one `Document` whose text reads
//! `"{subject} - {attribute}: {value}"` and whose label is the subject.

use crate::types::Document;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;
use tracing::info;

// --- Error Definitions ---

#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("Malformed knowledge base: {0}")]
    Malformed(String),
    #[error("Failed to read knowledge base '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse knowledge base JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Flattens a knowledge base into documents.
///
/// Subjects and attributes are visited in the object's own order and ids are
/// assigned from a single counter starting at 0, so they are contiguous across
/// the whole base.
pub fn flatten(knowledge_base: &Value) -> Result<Vec<Document>, KnowledgeError> {
    let subjects = knowledge_base.as_object().ok_or_else(|| {
        KnowledgeError::Malformed(format!(
            "expected a JSON object of subjects, found {}",
            json_kind(knowledge_base)
        ))
    })?;

    let mut documents = Vec::new();
    for (subject, details) in subjects {
        let attributes = details.as_object().ok_or_else(|| {
            KnowledgeError::Malformed(format!(
                "subject '{subject}' must map to an object of attributes, found {}",
                json_kind(details)
            ))
        })?;
        for (attribute, value) in attributes {
            let id = documents.len() as u64;
            let text = format!("{subject} - {attribute}: {}", render_fact(value));
            documents.push(Document::new(id, text, subject.clone()));
        }
    }
    Ok(documents)
}

/// Reads and parses the knowledge base file without flattening it.
pub async fn load_knowledge_base(path: impl AsRef<Path>) -> Result<Value, KnowledgeError> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| KnowledgeError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let value: Value = serde_json::from_str(&content)?;
    info!(path = %path.display(), "Loaded knowledge base");
    Ok(value)
}

/// Strings are written bare; any other JSON value is written as compact JSON.
fn render_fact(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
