//! HTTP adapter
//!
//! A thin axum layer over [`TreeRepository`]: JSON mutation routes behind a
//! role gate, plus read routes returning the flattened tree as JSON or as the
//! draggable HTML list.
//!
//! # Endpoints
//!
//! | Route | Operation |
//! |---|---|
//! | `GET /api/health` | liveness |
//! | `GET /api/tree` | JSON page of the flattened tree |
//! | `GET /api/tree/fragment` | HTML list fragment |
//! | `POST /api/nodes` | create |
//! | `PATCH /api/nodes/:id` | rename (`{ "title": ... }`) |
//! | `DELETE /api/nodes/:id` | delete subtree |
//! | `POST /api/nodes/:id/move` | move (`{ "parentId": ..., "position": ... }`) |

use crate::config::TreeConfig;
use crate::services::TreeRepository;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod fragments;
mod http_error;
mod node_endpoints;
mod tree_endpoints;

pub use auth::ROLE_HEADER;
pub use http_error::HttpError;
pub use node_endpoints::{CreateNodeInput, DeleteNodeResponse, MoveNodeInput, RenameNodeInput};
pub use tree_endpoints::{HealthStatus, PageQuery};

/// State shared across all endpoints
#[derive(Clone)]
pub struct AppState {
    pub repository: TreeRepository,
    pub config: Arc<TreeConfig>,
}

impl AppState {
    pub fn new(repository: TreeRepository, config: TreeConfig) -> Self {
        Self {
            repository,
            config: Arc::new(config),
        }
    }
}

/// Create the application router with every endpoint module merged in
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(tree_endpoints::routes(state.clone()))
        .merge(node_endpoints::routes(state))
        .layer(TraceLayer::new_for_http())
}

/// Bind `127.0.0.1:port` and serve until the process stops
///
/// # Errors
///
/// Returns error if the server fails to bind or start.
pub async fn start_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("127.0.0.1:{}", port);
    tracing::info!("HTTP server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
