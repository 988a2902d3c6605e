use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Default)]
pub struct DebugParams {
    pub debug: Option<bool>,
}

#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Value>,
    pub result: T,
}

// --- Chat ---

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ChatParams {
    pub farm_id: Option<String>,
}

/// What a chat request asks for, decided once from the query string and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatQuery {
    /// A farm is selected: answer from its sensor readings, the message is ignored.
    SensorDiagnosis { farm_id: String },
    /// No farm selected: answer the message through retrieval-augmented generation.
    OpenQuestion { message: String },
}

impl ChatQuery {
    /// An empty `farm_id` counts as no farm.
    pub fn resolve(params: ChatParams, request: ChatRequest) -> Self {
        match params.farm_id.filter(|id| !id.is_empty()) {
            Some(farm_id) => ChatQuery::SensorDiagnosis { farm_id },
            None => ChatQuery::OpenQuestion {
                message: request.message,
            },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub reply: String,
    pub source: String,
}

// --- Context retrieval ---

#[derive(Debug, Deserialize)]
pub struct ContextRequest {
    pub question: String,
    #[serde(default)]
    pub k: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ContextResponse {
    pub context: String,
}

// --- General ---

#[derive(Serialize, Deserialize, Debug)]
pub struct RootResponse {
    pub status: String,
    pub message: String,
    pub farms_loaded: Vec<String>,
}
