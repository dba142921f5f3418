//! Mutation endpoints
//!
//! - `POST /api/nodes` - Create a node (appended under its parent)
//! - `PATCH /api/nodes/:id` - Rename a node
//! - `DELETE /api/nodes/:id` - Delete a node and its subtree
//! - `POST /api/nodes/:id/move` - Move a node
//!
//! All of them sit behind [`require_mutation_role`].

use crate::api::auth::require_mutation_role;
use crate::api::{AppState, HttpError};
use crate::models::{Node, NodePlacement};
use crate::services::NewNode;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{patch, post},
    Router,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNodeInput {
    pub id: Option<String>,
    pub parent_id: Option<String>,
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameNodeInput {
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveNodeInput {
    /// New parent; absent, null or empty means root
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Position among the siblings as rendered
    pub position: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteNodeResponse {
    pub removed: Vec<String>,
}

/// Empty strings mean "no parent", matching `data-parent-id`
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn create_node(
    State(state): State<AppState>,
    Json(input): Json<CreateNodeInput>,
) -> Result<(StatusCode, Json<Node>), HttpError> {
    let node = state
        .repository
        .create_node(NewNode {
            id: non_empty(input.id),
            parent_id: non_empty(input.parent_id),
            label: input.label,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(node)))
}

async fn rename_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<RenameNodeInput>,
) -> Result<Json<Node>, HttpError> {
    let node = state.repository.rename(&id, &input.title).await?;
    Ok(Json(node))
}

async fn delete_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteNodeResponse>, HttpError> {
    let removed = state.repository.delete(&id).await?;
    Ok(Json(DeleteNodeResponse { removed }))
}

async fn move_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<MoveNodeInput>,
) -> Result<Json<NodePlacement>, HttpError> {
    let parent_id = non_empty(input.parent_id);
    let placement = state
        .repository
        .move_node(&id, parent_id.as_deref(), input.position)
        .await?;
    Ok(Json(placement))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/nodes", post(create_node))
        .route("/api/nodes/:id", patch(rename_node).delete(delete_node))
        .route("/api/nodes/:id/move", post(move_node))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_mutation_role,
        ))
        .with_state(state)
}
