use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use searchgate::api::create_router;
use searchgate::config::Config;
use searchgate::db::{Database, SearchLogRepo};
use searchgate::orchestrator::SearchOrchestrator;

#[derive(Debug, Parser)]
#[command(name = "searchgate", about = "Authenticated search front end for the manager service")]
struct Args {
    /// Address to listen on (overrides BIND_ADDR)
    #[arg(long)]
    bind: Option<String>,

    /// Directory of static UI assets (overrides STATIC_DIR)
    #[arg(long)]
    static_dir: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Bridge log crate -> tracing (reqwest, mongodb and hyper log through `log`)
    tracing_log::LogTracer::init()?;

    let args = Args::parse();
    let mut config = Config::from_env()?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(static_dir) = args.static_dir {
        config.static_dir = static_dir;
    }

    if let Err(missing) = config.identity() {
        tracing::warn!(missing, "identity provider not configured, searches will fail");
    }

    let search_logs = Database::from_config(&config)
        .await?
        .map(|db| SearchLogRepo::new(&db));
    if search_logs.is_none() {
        tracing::info!("MONGO_URI not set, search logging disabled");
    }

    let bind_addr = config.bind_addr.clone();
    tracing::info!(
        manager_url = %config.manager_url,
        manager_timeout_ms = config.manager_timeout.as_millis() as u64,
        "starting searchgate"
    );

    let orchestrator = Arc::new(SearchOrchestrator::new(Arc::new(config), search_logs));
    let app = create_router(orchestrator);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
