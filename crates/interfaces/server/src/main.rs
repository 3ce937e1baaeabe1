//! The Joule bridge: HTTP/SSE front door for the agent runtime and the
//! natural-language interpreter.

mod routes;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use joule_agent::RunManager;
use joule_config::AppConfig;
use joule_memory::{MemoryFileStore, SharedMemory, spawn_flush_task};
use joule_tools::default_registry;

use routes::{AppState, build_router};

#[derive(Debug, Parser)]
#[command(
    name = "joule-bridge",
    version,
    about = "Natural-language bridge for the Joule climate assistant"
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "config/default.toml")]
    config: String,

    /// Override the configured bind address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load_from(&cli.config)?;
    if let Some(bind) = cli.bind {
        config.server.bind_addr = bind;
    }

    let files = MemoryFileStore::new(&config.memory.file_path);
    let memory = SharedMemory::load_from(&files);
    info!(path = %files.path().display(), "memory loaded");

    let registry = default_registry(memory.clone());
    let manager = Arc::new(RunManager::new(registry, memory.clone()));

    let flush_task = spawn_flush_task(
        memory.clone(),
        files.clone(),
        Duration::from_secs(config.memory.flush_interval_secs.max(1)),
    );

    let home_city = Some(config.assistant.home_city.trim().to_string())
        .filter(|city| !city.is_empty());
    let state = AppState {
        manager,
        memory: memory.clone(),
        api_key: config.required_api_key().map(str::to_string),
        home_city,
    };
    let router = build_router(state, config.server.permissive_cors);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!(
        assistant = %config.assistant.name,
        addr = %config.server.bind_addr,
        auth = config.required_api_key().is_some(),
        "joule bridge listening"
    );
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Best-effort final flush; an unflushed write lost here is accepted
    // (memory is an assistive cache, not a system of record).
    flush_task.abort();
    if memory.flush(&files).await {
        info!("final memory flush written");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to install ctrl-c handler");
        // Fall back to never resolving; the process exits via SIGKILL.
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
