//! Read endpoints
//!
//! - `GET /api/health` - Health check
//! - `GET /api/tree?offset=&limit=` - One page of the flattened tree as JSON
//! - `GET /api/tree/fragment?offset=&limit=` - The same page as an HTML list

use crate::api::fragments::render_list;
use crate::api::{AppState, HttpError};
use crate::config::MAX_PAGE_SIZE;
use crate::models::FlatEntry;
use crate::services::Page;
use axum::{
    extract::{Query, State},
    response::{Html, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

/// Paging query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Start offset; out-of-range values are clamped
    pub offset: Option<i64>,
    /// Page size; defaults to the configured page size
    pub limit: Option<usize>,
}

impl PageQuery {
    fn page_size(&self, default: usize) -> usize {
        self.limit.unwrap_or(default).clamp(1, MAX_PAGE_SIZE)
    }
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn load_page(state: &AppState, query: &PageQuery) -> Result<Page<FlatEntry>, HttpError> {
    let page_size = query.page_size(state.config.page_size);
    let page = state
        .repository
        .list_page(query.offset.unwrap_or(0), page_size)
        .await?;
    Ok(page)
}

/// Flattened tree page as JSON
///
/// ```bash
/// curl "http://localhost:3001/api/tree?offset=0&limit=20"
/// ```
async fn get_tree(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<FlatEntry>>, HttpError> {
    Ok(Json(load_page(&state, &query).await?))
}

/// Flattened tree page as the draggable HTML list
async fn get_tree_fragment(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, HttpError> {
    let page = load_page(&state, &query).await?;
    Ok(Html(render_list(&page)))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/tree", get(get_tree))
        .route("/api/tree/fragment", get(get_tree_fragment))
        .with_state(state)
}
