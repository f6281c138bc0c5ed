//! # School Portal Server
//!
//! Serves the `/api` routes over the datastore named by `STORAGE_BACKEND`.
//!
//! ## Usage
//!
//! ```bash
//! # SQLite at data/school_portal.db
//! cargo run --bin school-portal-server
//!
//! # Demo mode: in-memory and seeded
//! STORAGE_BACKEND=memory RUST_LOG=debug cargo run --bin school-portal-server
//! ```
//!
//! See [`school_portal::config`] for every variable.

use school_portal::auth::TokenIssuer;
use school_portal::config::{ServerConfig, StorageBackend};
use school_portal::server::{self, AppState};
use school_portal::storage::{Datastore, InMemoryStorage, SqliteStorage};
use school_portal::{PortalResult, demo};
use std::process;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run().await {
        log::error!("Server failed: {}", e);
        eprintln!("❌ {}", e);
        process::exit(1);
    }
}

async fn run() -> PortalResult<()> {
    let config = ServerConfig::from_env()?;
    config.log_summary();

    let datastore = match &config.storage {
        StorageBackend::Memory => Datastore::Memory(InMemoryStorage::new()),
        StorageBackend::Sqlite { path } => {
            Datastore::Sqlite(SqliteStorage::new_with_path(path).await?)
        }
    };
    log::info!("Datastore: {}", datastore.describe());

    let tokens = TokenIssuer::new(&config.jwt_secret);
    let state = AppState::new(datastore, tokens, config.expose_errors()).await?;

    if config.storage.is_demo() {
        demo::seed(&state).await?;
    }

    let app = server::router(state, config.cors_origin_header()?);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    log::info!("School portal listening on http://{}", config.bind_addr());
    log::info!("Test endpoint: http://{}/api/test", config.bind_addr());

    axum::serve(listener, app).await?;
    Ok(())
}
