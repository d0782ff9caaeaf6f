//! Resource Server binary
//!
//! Wires configuration, storage, the persistence gateway, the business-rule
//! service and the HTTP router, then serves until Ctrl-C.

use anyhow::{Context, Result};
use resource_server::config::{ServerConfig, StorageBackend};
use resource_server::gateway::PersistenceGateway;
use resource_server::services::ResourceService;
use resource_server::storage::{Database, MemoryStore, ResourceRepository};
use resource_server::{build_router, AppState};
use resource_types::Resource;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting Resource Server v{}", env!("CARGO_PKG_VERSION"));
    info!("PID: {}", std::process::id());

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    info!("Loading configuration...");
    let config = ServerConfig::load().context("Failed to load configuration")?;
    info!(
        "Config loaded: bind={}, backend={:?}",
        config.bind_address, config.storage.backend
    );

    let adapter = open_storage(&config).await?;
    let gateway = Arc::new(PersistenceGateway::<Resource>::new(adapter));
    let service = Arc::new(ResourceService::<Resource>::new(gateway));

    let shutdown = CancellationToken::new();
    let state = AppState::<Resource>::new(service)
        .with_shutdown(shutdown.clone())
        .with_request_timeout(config.request_timeout());

    let app = build_router(state);

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown requested, cancelling in-flight requests");
            shutdown.cancel();
        })
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn open_storage(config: &ServerConfig) -> Result<Arc<dyn ResourceRepository<Resource>>> {
    match config.storage.backend {
        StorageBackend::Sqlite => {
            info!("Initializing SQLite database...");
            let db = Database::new(&config.storage.database_path)
                .await
                .context("Failed to initialize database")?;
            let adapter = db
                .adapter::<Resource>()
                .await
                .context("Failed to prepare resource table")?;
            info!(
                "SQLite database initialized at: {}",
                config.storage.database_path
            );
            Ok(Arc::new(adapter))
        }
        StorageBackend::Memory => {
            let store = MemoryStore::with_records(config.storage.seed_resources());
            info!("In-memory store initialized with {} records", store.len().await);
            Ok(Arc::new(store))
        }
    }
}
