//! deftree HTTP Server
//!
//! Opens the tree database and serves the mutation and list routes.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin deftree-server
//!
//! TREE_SERVER_PORT=3002 TREE_DB_PATH=/tmp/tree.db cargo run --bin deftree-server
//! ```
//!
//! # Environment Variables
//!
//! See [`deftree_core::config`] for the `TREE_*` variables.
//! `RUST_LOG` sets the logging level (e.g., "info", "debug", "trace").

use std::sync::Arc;

use deftree_core::api::{self, AppState};
use deftree_core::{DatabaseService, TreeConfig, TreeRepository, TursoStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = TreeConfig::from_env()?;

    tracing::info!("deftree server");
    tracing::info!("Port: {}", config.server_port);
    tracing::info!("Database: {}", config.db_path.display());
    tracing::info!("Mutating roles: {}", config.allowed_roles.join(", "));

    let db = Arc::new(DatabaseService::new(config.db_path.clone()).await?);
    let store = Arc::new(TursoStore::new(db));
    let repository = TreeRepository::new(store).with_label_max_chars(config.label_max_chars);

    let port = config.server_port;
    let state = AppState::new(repository.clone(), config);

    let served = api::start_server(state, port).await;

    if let Err(e) = repository.close().await {
        tracing::warn!("Failed to checkpoint database on shutdown: {}", e);
    }

    served
}
