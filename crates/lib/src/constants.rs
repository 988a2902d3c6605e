//! # Constants
//!
//! Defaults shared by the library and the server configuration layer.

/// Number of documents retrieved as context when the caller does not specify one.
pub const DEFAULT_TOP_K: i64 = 3;

/// Chat model used for agronomist answers unless configured otherwise.
pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";

/// Low sampling temperature keeps answers close to the retrieved context.
pub const DEFAULT_LLM_TEMPERATURE: f32 = 0.2;

/// Groq's OpenAI-compatible chat completion endpoint.
pub const DEFAULT_LLM_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// `source` reported with agronomist answers in chat replies.
pub const DEFAULT_RAG_SOURCE: &str = "Groq LLM + RAG";

/// Upper bound for a single outbound request to an AI service.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Dimension of the offline hashing embedder.
pub const DEFAULT_HASHING_DIMENSIONS: usize = 384;

// --- Sensor thresholds ---

/// Electrical conductivity (mS/cm) below which nutrients are considered deficient.
pub const MIN_EC: f64 = 1.2;
/// Air temperature (°C) below which crops suffer cold stress.
pub const MIN_TEMPERATURE_C: f64 = 18.0;
/// Photosynthetic photon flux density (µmol/m²/s) below which light is insufficient.
pub const MIN_PPFD: f64 = 200.0;
