use std::sync::Arc;

use anyhow::Context;
use dainichi_line_bot::{init_tracing, router, AppState, EventHandler, LineClient, ServerConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv::dotenv().ok();

    init_tracing();

    if let Err(e) = run().await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;
    let client = LineClient::new(config.access_token.clone(), config.endpoints.clone())?;
    let handler = EventHandler::new(Arc::new(client), config.handler.clone());

    let app = router(AppState::new(handler, &config.channel_secret));

    let addr = format!("0.0.0.0:{}", config.port);
    info!("Starting Dainichi LINE bot on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
