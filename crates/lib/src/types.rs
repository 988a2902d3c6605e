use serde::{Deserialize, Serialize};

/// A flattened knowledge-base fact ready to be embedded.
///
/// `text` is what gets embedded and returned as context; `label` is the subject
/// the fact belongs to and travels with the document as retrieval metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: u64,
    pub text: String,
    pub label: String,
}

impl Document {
    pub fn new(id: u64, text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            label: label.into(),
        }
    }
}

/// One hit from a nearest-neighbour query.
///
/// `distance` is the cosine distance to the query vector (0.0 is identical).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub id: u64,
    pub text: String,
    pub label: String,
    pub distance: f64,
}

/// A single message of a chat-completion prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Everything a chat-completion provider needs for one call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}
