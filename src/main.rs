//! hookrelay - payment webhook relay binary.

use hookrelay::RelayConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a local .env before reading configuration
    dotenvy::dotenv().ok();

    let config = RelayConfig::load()?;

    hookrelay::server::start_server(config).await?;

    Ok(())
}
