//! # Common Test Utilities
//!
//! `TestApp` spawns the real server on a random port, configured through a temporary
//! `config.yml` that points the LLM at an `httpmock::MockServer` and reads the sample
//! data shipped in `crates/server/data`.

// Not every test file uses every helper.
#![allow(unused)]

use agrorag_server::{
    config, router,
    state::{build_app_state, AppState},
};
use anyhow::Result;
use axum::serve;
use httpmock::MockServer;
use reqwest::Client;
use serde_json::{json, Value};
use std::{fs::File, io::Write, net::SocketAddr, path::Path};
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

pub const TEST_API_KEY: &str = "test-key";
pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Directory of the sample farm, rules and knowledge-base files.
pub fn sample_data_dir() -> String {
    format!("{}/data", env!("CARGO_MANIFEST_DIR"))
}

/// Writes a `config.yml` into `dir` pointing the LLM at `mock_server`.
///
/// `extra` is appended verbatim, so tests can add or override sections.
pub fn write_test_config(
    dir: &Path,
    mock_server: &MockServer,
    data_dir: &str,
    extra: &str,
) -> Result<String> {
    write_test_config_with_llm(dir, mock_server, data_dir, "", extra)
}

/// Like `write_test_config`, with `llm_extra` appended inside the `llm:` section.
/// Each of its lines must be indented by two spaces.
pub fn write_test_config_with_llm(
    dir: &Path,
    mock_server: &MockServer,
    data_dir: &str,
    llm_extra: &str,
    extra: &str,
) -> Result<String> {
    let config_path = dir.join("config.yml");
    let config_content = format!(
        r#"
port: 0
data_dir: "{data_dir}"
llm:
  api_url: "{}"
  api_key: "{TEST_API_KEY}"
  model_name: "llama-3.3-70b-versatile"
  temperature: 0.2
  top_k: 3
{llm_extra}
{extra}
"#,
        mock_server.url(CHAT_COMPLETIONS_PATH),
    );
    let mut file = File::create(&config_path)?;
    file.write_all(config_content.as_bytes())?;
    Ok(config_path.to_string_lossy().into_owned())
}

/// An OpenAI-style chat completion body answering `content`.
pub fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "llama-3.3-70b-versatile",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

// --- Full Application Test Harness ---

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub app_state: AppState,
    _config_dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the server over the sample data with the default (in-memory, hashing)
    /// index.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_config("").await
    }

    pub async fn spawn_with_config(extra: &str) -> Result<Self> {
        Self::spawn_with_llm_config("", extra).await
    }

    /// Spawns with `llm_extra` added to the `llm:` section and `extra` appended.
    pub async fn spawn_with_llm_config(llm_extra: &str, extra: &str) -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let mock_server = MockServer::start_async().await;
        let config_dir = tempdir()?;
        let config_path = write_test_config_with_llm(
            config_dir.path(),
            &mock_server,
            &sample_data_dir(),
            llm_extra,
            extra,
        )?;

        let config = config::get_config(Some(&config_path))?;
        let app_state = build_app_state(config).await?;
        let app_state_for_harness = app_state.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            app_state: app_state_for_harness,
            _config_dir: config_dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.address)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            // The server task may already be gone.
            let _ = tx.send(());
        }
    }
}
