use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use parley_server::ai::GeminiProvider;
use parley_server::config::ServerConfig;
use parley_server::engine::chat_engine::ChatEngine;
use parley_server::web::app_state::AppState;
use parley_server::web::router::build_router;

/// Chat server with a resident AI participant.
#[derive(Parser)]
#[command(name = "parley-server", version)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "parley.toml")]
    config: String,

    /// Override the listen address from the config file.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(&cli.config);
    let web_addr = cli
        .bind
        .unwrap_or_else(|| config.server.web_address.clone());

    let provider = Arc::new(GeminiProvider::new(
        &config.ai.model,
        config.ai.api_key.clone(),
    ));

    let engine = Arc::new(ChatEngine::new(provider, config.turn_settings()));
    engine.seed_welcome();

    let app_state = Arc::new(AppState { engine });
    let app = build_router(app_state);

    info!(%web_addr, "parley server starting");

    let listener = tokio::net::TcpListener::bind(&web_addr)
        .await
        .with_context(|| format!("failed to bind {web_addr}"))?;

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
