//! aprende-server: generation gateway binary

use anyhow::Context;
use aprende_core::config::{self, ChainVariant, ConfigValidator, GatewayConfig};
use aprende_server::{router, AppState};
use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "aprende-server", version, about = "Multi-provider generation gateway")]
struct Args {
    /// YAML or JSON configuration file; without it the environment is used
    #[arg(long, env = "APRENDE_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overrides the configuration
    #[arg(long, env = "APRENDE_BIND")]
    bind: Option<String>,

    /// Provider chain: two_provider or three_provider
    #[arg(long)]
    chain: Option<ChainVariant>,
}

fn load_config(args: &Args) -> anyhow::Result<GatewayConfig> {
    let mut config = match &args.config {
        Some(path) => config::load_from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => GatewayConfig::from_env().context("reading configuration from environment")?,
    };

    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
    }
    if let Some(variant) = args.chain {
        config.chain.variant = variant;
        config.chain.order = None;
    }

    ConfigValidator::new().validate(&config)?;
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real deployments set variables directly
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    info!("aprende-server {} starting", aprende_core::version());
    info!(
        "Provider chain ({}): attempt timeout {}ms",
        config.chain.variant.as_str(),
        config.chain.attempt_timeout_ms
    );
    for (name, provider) in config.chain_providers() {
        info!(
            "  {} model={} classification={:?} key={}",
            name,
            provider.model,
            provider.classification,
            provider.api_key.partial_redact()
        );
    }

    let state = AppState::from_config(&config)?;
    let app = router(state, config.server.max_body_bytes);

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("binding {}", config.server.bind))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
