mod auth;
mod clock;
mod config;
mod errors;
mod insights;
mod llm_client;
mod models;
mod routes;
mod state;
mod storage;
mod store;
mod tracking;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::clock::SystemClock;
use crate::config::{Config, StorageBackend};
use crate::insights::InsightService;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{FileStorage, KeyValueStorage, MemoryStorage, RedisStorage};
use crate::store::LocalStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("aquadaily_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting AquaDaily API v{}", env!("CARGO_PKG_VERSION"));

    let storage = open_storage(&config).await?;
    let store = LocalStore::open(storage.clone(), Arc::new(SystemClock)).await?;
    info!("Local store ready ({:?} backend)", config.storage_backend);

    let gemini = GeminiClient::new(config.gemini_base_url.clone())?;
    let insights = InsightService::new(Arc::new(gemini), storage, config.gemini_api_key.clone());
    info!(
        "LLM client initialized (model: {}, key configured: {})",
        llm_client::MODEL,
        insights.has_api_key().await
    );

    let state = AppState {
        store,
        insights,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.bind_addr, config.port)
        .parse()
        .context("BIND_ADDR and PORT must form a valid socket address")?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn open_storage(config: &Config) -> Result<Arc<dyn KeyValueStorage>> {
    let storage: Arc<dyn KeyValueStorage> = match config.storage_backend {
        StorageBackend::File => Arc::new(FileStorage::open(&config.data_dir).await?),
        StorageBackend::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .context("REDIS_URL is required for the redis backend")?;
            Arc::new(RedisStorage::open(url)?)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            Arc::new(MemoryStorage::new())
        }
    };
    Ok(storage)
}
