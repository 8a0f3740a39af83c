use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use argo_web_api::config::{AppConfig, StoreBackend};
use argo_web_api::database::{DatabaseManager, MemoryStore, Store};
use argo_web_api::{app, AppState};

#[derive(Debug, Parser)]
#[command(name = "argo-web-api", version, about = "Multi-tenant availability and status API")]
struct Args {
    /// YAML configuration file (takes precedence over ARGO_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so local runs pick up ARGO_* settings
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => AppConfig::from_yaml_file(path)?.with_env_overrides(),
        None => AppConfig::load()?,
    };
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    info!("Starting argo-web-api in {:?} mode", config.environment);

    let mut mongo = None;
    let store: Arc<dyn Store> = match config.store.backend {
        StoreBackend::Memory => match &config.store.seed_file {
            Some(path) => Arc::new(MemoryStore::from_yaml_file(path)?),
            None => Arc::new(MemoryStore::new()),
        },
        StoreBackend::Mongodb => {
            let manager = Arc::new(DatabaseManager::new());
            mongo = Some(manager.clone());
            manager
        }
    };
    info!("Using {:?} store backend", config.store.backend);

    let bind_addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("argo-web-api listening on http://{}", bind_addr);

    axum::serve(listener, app(AppState::new(config, store)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(manager) = mongo {
        manager.close_all().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
