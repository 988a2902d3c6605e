//! # Application State
//!
//! Defines the shared application state (`AppState`) and the logic for building it
//! at startup: load the data files, build the embedding index from the knowledge
//! base, and wire the agronomist to the configured LLM. Everything is read-only once
//! the server starts serving.

use crate::config::{
    AppConfig, EmbeddingConfig, EmbeddingProviderKind, IndexBackend, IndexConfig, LlmConfig,
};
use agrorag::{
    diagnosis::{load_diagnostic_rules, load_farm_data, DiagnosticRules, FarmRegistry},
    ingest::{flatten, load_knowledge_base},
    providers::{
        ai::{AiProvider, Embedder, HashingEmbedder, HttpEmbedder, LocalAiProvider},
        db::{memory::MemoryStore, sqlite::SqliteStore, storage::VectorStore},
    },
    Agronomist, AgronomistSettings, ContextRetriever, EmbeddingIndex,
};
use serde_json::Value;
use std::{path::Path, sync::Arc, time::Duration};
use tracing::info;

pub const FARM_DATA_FILE: &str = "sample_farm_data.json";
pub const DIAGNOSTIC_RULES_FILE: &str = "diagnostic_rules.json";
pub const KNOWLEDGE_BASE_FILE: &str = "agricultural_knowledge_base.json";

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Farm sensor snapshot, indexed by farm id.
    pub farms: Arc<FarmRegistry>,
    /// Issue type → recommendation.
    pub rules: Arc<DiagnosticRules>,
    /// The raw knowledge base, served as-is by the crop knowledge endpoint.
    pub knowledge_base: Arc<Value>,
    /// RAG gateway over the embedding index built from `knowledge_base`.
    pub agronomist: Arc<Agronomist>,
}

/// Builds the shared application state from the configuration.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let data_dir = Path::new(&config.data_dir);
    let farms = FarmRegistry::new(load_farm_data(data_dir.join(FARM_DATA_FILE)).await?)?;
    let rules = load_diagnostic_rules(data_dir.join(DIAGNOSTIC_RULES_FILE)).await?;
    let knowledge_base = load_knowledge_base(data_dir.join(KNOWLEDGE_BASE_FILE)).await?;

    let documents = flatten(&knowledge_base)?;
    let index = EmbeddingIndex::new(
        build_embedder(&config.embedding, config.llm.timeout_secs)?,
        build_store(&config.index).await?,
    );
    // Clearing first keeps restarts against a persistent store from duplicating rows.
    index.rebuild(&documents).await?;
    info!(
        documents = documents.len(),
        backend = index.backend(),
        "Knowledge base indexed"
    );

    let settings = AgronomistSettings {
        model: config.llm.model_name.clone(),
        temperature: config.llm.temperature,
        top_k: config.llm.top_k,
        system_prompt: config.prompts.system_prompt.clone(),
        user_prompt: config.prompts.user_prompt.clone(),
    };
    let agronomist = Agronomist::new(
        ContextRetriever::new(Arc::new(index)),
        build_ai_provider(&config.llm)?,
        settings,
    );

    Ok(AppState {
        config: Arc::new(config),
        farms: Arc::new(farms),
        rules: Arc::new(rules),
        knowledge_base: Arc::new(knowledge_base),
        agronomist: Arc::new(agronomist),
    })
}

fn build_embedder(
    config: &EmbeddingConfig,
    timeout_secs: u64,
) -> anyhow::Result<Box<dyn Embedder>> {
    match config.provider {
        EmbeddingProviderKind::Hashing => {
            info!(dimensions = config.dimensions, "Using offline hashing embedder.");
            Ok(Box::new(HashingEmbedder::new(config.dimensions)))
        }
        EmbeddingProviderKind::Http => {
            let api_url = config.api_url.clone().ok_or_else(|| {
                anyhow::anyhow!("embedding.api_url is required for the http embedding provider")
            })?;
            let model = config.model_name.clone().ok_or_else(|| {
                anyhow::anyhow!("embedding.model_name is required for the http embedding provider")
            })?;
            info!(%api_url, %model, "Using remote embeddings service.");
            Ok(Box::new(HttpEmbedder::new(
                api_url,
                model,
                config.api_key.clone(),
                Duration::from_secs(timeout_secs),
            )?))
        }
    }
}

async fn build_store(config: &IndexConfig) -> anyhow::Result<Arc<dyn VectorStore>> {
    match config.backend {
        IndexBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        IndexBackend::Sqlite => {
            if let Some(parent) = Path::new(&config.db_url).parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            let store = SqliteStore::new(&config.db_url).await?;
            info!(db_path = %config.db_url, "Initialized vector storage (SQLite).");
            Ok(Arc::new(store))
        }
    }
}

fn build_ai_provider(config: &LlmConfig) -> anyhow::Result<Box<dyn AiProvider>> {
    if config.api_key.is_none() {
        tracing::warn!("No LLM API key configured; requests are sent unauthenticated.");
    }
    Ok(Box::new(LocalAiProvider::new(
        config.api_url.clone(),
        config.api_key.clone(),
        Duration::from_secs(config.timeout_secs),
    )?))
}
