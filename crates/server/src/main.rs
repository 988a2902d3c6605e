#[tokio::main]
async fn main() -> anyhow::Result<()> {
    agrorag_server::start().await
}
