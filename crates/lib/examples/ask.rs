use agrorag::{
    constants::{DEFAULT_HASHING_DIMENSIONS, DEFAULT_LLM_API_URL, DEFAULT_REQUEST_TIMEOUT_SECS},
    ingest::{flatten, load_knowledge_base},
    providers::{
        ai::{HashingEmbedder, LocalAiProvider},
        db::memory::MemoryStore,
    },
    Agronomist, AgronomistSettings, ContextRetriever, EmbeddingIndex,
};
use dotenvy::dotenv;
use std::{env, sync::Arc, time::Duration};

const SAMPLE_KNOWLEDGE_BASE: &str = "crates/server/data/agricultural_knowledge_base.json";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    dotenv().ok();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <knowledge_base.json> '<question>'", args[0]);
        eprintln!();
        eprintln!(
            "Example: {} {SAMPLE_KNOWLEDGE_BASE} 'What is ideal EC for lettuce?'",
            args[0]
        );
        return Ok(());
    }

    let knowledge_base = load_knowledge_base(&args[1]).await?;
    let documents = flatten(&knowledge_base)?;
    let index = EmbeddingIndex::new(
        Box::new(HashingEmbedder::new(DEFAULT_HASHING_DIMENSIONS)),
        Arc::new(MemoryStore::new()),
    );
    index.ingest(&documents).await?;
    let retriever = ContextRetriever::new(Arc::new(index));

    // Without a key, only show what the question would be grounded on.
    let api_key = env::var("LLM_API_KEY").or_else(|_| env::var("GROQ_API_KEY")).ok();
    let Some(api_key) = api_key else {
        let context = retriever
            .retrieve_context(&args[2], AgronomistSettings::default().top_k)
            .await?;
        println!("--- Context (set GROQ_API_KEY to get an answer) ---\n{context}");
        return Ok(());
    };

    let api_url = env::var("LLM_API_URL").unwrap_or_else(|_| DEFAULT_LLM_API_URL.to_string());
    let provider = LocalAiProvider::new(
        api_url,
        Some(api_key),
        Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
    )?;
    let agronomist = Agronomist::new(retriever, Box::new(provider), AgronomistSettings::default());

    let answer = agronomist.ask(&args[2]).await?;
    println!("--- Context ---\n{}\n\n--- Answer ---\n{}", answer.context, answer.text);
    Ok(())
}
