//! # Application Configuration
//!
//! Defines the configuration structure for `agrorag-server` and the logic for loading
//! it from an optional `config.yml` file and environment variables.

use agrorag::{
    constants::{
        DEFAULT_HASHING_DIMENSIONS, DEFAULT_LLM_API_URL, DEFAULT_LLM_MODEL,
        DEFAULT_LLM_TEMPERATURE, DEFAULT_RAG_SOURCE, DEFAULT_REQUEST_TIMEOUT_SECS,
        DEFAULT_TOP_K,
    },
    prompts::tasks::{AGRONOMIST_SYSTEM_PROMPT, AGRONOMIST_USER_PROMPT},
};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use std::{env, fs, path::Path};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// An error from the underlying `config` crate.
    #[error("Configuration error: {0}")]
    General(String),
    /// An explicitly requested configuration file was not found.
    #[error("{0}")]
    NotFound(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Loaded from the `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the farm snapshot, the diagnostic rules and the knowledge base.
    /// Loaded from the `DATA_DIR` env var.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub prompts: PromptConfig,
}

fn default_port() -> u16 {
    8000
}

fn default_data_dir() -> String {
    format!("{}/data", env!("CARGO_MANIFEST_DIR"))
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    #[default]
    Memory,
    Sqlite,
}

/// Where the embedding index keeps its vectors.
#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    #[serde(default)]
    pub backend: IndexBackend,
    /// Path of the SQLite file when `backend` is `sqlite`.
    #[serde(default = "default_db_url")]
    pub db_url: String,
}

fn default_db_url() -> String {
    "db/agrorag.db".to_string()
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::default(),
            db_url: default_db_url(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// Offline token-hashing embedder.
    #[default]
    Hashing,
    /// Remote OpenAI-compatible or Gemini embeddings endpoint.
    Http,
}

/// Configuration for the text embedding model.
#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProviderKind,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Vector size of the hashing embedder.
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

fn default_dimensions() -> usize {
    DEFAULT_HASHING_DIMENSIONS
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::default(),
            api_url: None,
            model_name: None,
            api_key: None,
            dimensions: default_dimensions(),
        }
    }
}

/// The chat-completion service and its sampling settings.
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_llm_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_llm_model")]
    pub model_name: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Applies to embedding requests as well.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_top_k")]
    pub top_k: i64,
    /// `source` of chat replies answered by this model.
    #[serde(default = "default_source_label")]
    pub source_label: String,
}

fn default_llm_api_url() -> String {
    DEFAULT_LLM_API_URL.to_string()
}

fn default_llm_model() -> String {
    DEFAULT_LLM_MODEL.to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_LLM_TEMPERATURE
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_top_k() -> i64 {
    DEFAULT_TOP_K
}

fn default_source_label() -> String {
    DEFAULT_RAG_SOURCE.to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: default_llm_api_url(),
            api_key: None,
            model_name: default_llm_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            top_k: default_top_k(),
            source_label: default_source_label(),
        }
    }
}

/// Prompt templates for the agronomist. The user prompt takes `{context}` and `{prompt}`.
#[derive(Debug, Deserialize, Clone)]
pub struct PromptConfig {
    pub system_prompt: String,
    pub user_prompt: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_prompt: AGRONOMIST_SYSTEM_PROMPT.to_string(),
            user_prompt: AGRONOMIST_USER_PROMPT.to_string(),
        }
    }
}

// Reads a file and substitutes `${VAR}` references from the environment.
// Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        env::var(&caps["var"]).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Loads the application configuration from a file and environment variables.
///
/// - `config_path_override` must exist when given; otherwise `config.yml` next to the
///   crate manifest is used if present.
/// - Top-level keys like `port` and `data_dir` are overridden by `PORT` and `DATA_DIR`.
/// - Nested keys are overridden by `AGRORAG_...` variables (e.g. `AGRORAG_LLM__MODEL_NAME`).
/// - The LLM key falls back to `LLM_API_KEY`, then `GROQ_API_KEY`.
/// - `llm.top_k` must be positive.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let base_path = env!("CARGO_MANIFEST_DIR");
    let mut builder = ConfigBuilder::builder()
        // Layer 1: Programmatic defaults from the library.
        .set_default("prompts.system_prompt", AGRONOMIST_SYSTEM_PROMPT)?
        .set_default("prompts.user_prompt", AGRONOMIST_USER_PROMPT)?;

    // Layer 2: Config file (optional unless explicitly requested).
    let main_content = match config_path_override {
        Some(path) => Some(read_and_substitute(path)?.ok_or_else(|| {
            ConfigError::NotFound(format!("Config file not found at '{path}'."))
        })?),
        None => {
            let user_config_path = format!("{base_path}/config.yml");
            let content = read_and_substitute(&user_config_path)?;
            if content.is_some() {
                info!("Loading user-defined configuration from '{user_config_path}'.");
            }
            content
        }
    };
    if let Some(content) = main_content {
        builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
    }

    let settings = builder
        // Layer 3: Environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Layer 4: Prefixed environment variables for nested overrides.
        .add_source(
            Environment::with_prefix("AGRORAG")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;
    if config.llm.top_k <= 0 {
        return Err(ConfigError::General(format!(
            "llm.top_k must be positive, got {}",
            config.llm.top_k
        )));
    }

    // `${VAR}` substitution leaves empty strings behind for unset variables.
    config.llm.api_key = non_empty(config.llm.api_key)
        .or_else(|| non_empty(env::var("LLM_API_KEY").ok()))
        .or_else(|| non_empty(env::var("GROQ_API_KEY").ok()));
    config.embedding.api_key = non_empty(config.embedding.api_key);
    config.embedding.api_url = non_empty(config.embedding.api_url);
    config.embedding.model_name = non_empty(config.embedding.model_name);

    Ok(config)
}
