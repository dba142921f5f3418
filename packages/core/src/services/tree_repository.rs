//! Tree Repository
//!
//! `TreeRepository` is the mutation engine: every structural operation hands
//! the [`NodeStore`] a planner that runs on an owned [`Tree`] loaded inside
//! the write transaction, so existence and cycle checks are made against the
//! same rows the resulting [`TreeChanges`] are written over. Nothing is
//! cached between calls.
//!
//! Domain events are broadcast only after the store has committed.

use crate::db::{DomainEvent, NodeStore};
use crate::models::{
    validate_label, validate_node_id, FlatEntry, Node, NodePlacement, Tree,
    DEFAULT_LABEL_MAX_CHARS,
};
use crate::services::error::TreeServiceError;
use crate::services::flattener::flatten;
use crate::services::pagination::{present_page, Page};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of the domain event channel
const DOMAIN_EVENT_CHANNEL_CAPACITY: usize = 128;

/// Input for [`TreeRepository::create_node`]
#[derive(Debug, Clone, Default)]
pub struct NewNode {
    /// Explicit id; a UUID v4 is generated when absent
    pub id: Option<String>,
    /// Parent id, `None` for a root
    pub parent_id: Option<String>,
    pub label: String,
}

impl NewNode {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn under(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

/// Loads, mutates and persists the definition tree
///
/// # Examples
///
/// ```no_run
/// # use deftree_core::db::{DatabaseService, TursoStore};
/// # use deftree_core::services::{NewNode, TreeRepository};
/// # use std::path::PathBuf;
/// # use std::sync::Arc;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let db = Arc::new(DatabaseService::new(PathBuf::from("./data/deftree.db")).await?);
/// let repository = TreeRepository::new(Arc::new(TursoStore::new(db)));
///
/// let root = repository.create_node(NewNode::new("Components").with_id("1")).await?;
/// let button = repository.create_node(NewNode::new("Button").under(&root.id)).await?;
/// repository.rename(&button.id, "Primary button").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TreeRepository {
    store: Arc<dyn NodeStore>,
    label_max_chars: usize,
    event_tx: broadcast::Sender<DomainEvent>,
}

impl TreeRepository {
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        let (event_tx, _) = broadcast::channel(DOMAIN_EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            label_max_chars: DEFAULT_LABEL_MAX_CHARS,
            event_tx,
        }
    }

    /// Override the label length bound (in code points)
    pub fn with_label_max_chars(mut self, label_max_chars: usize) -> Self {
        self.label_max_chars = label_max_chars;
        self
    }

    pub fn label_max_chars(&self) -> usize {
        self.label_max_chars
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<dyn NodeStore> {
        &self.store
    }

    /// Subscribe to domain events
    ///
    /// The receiver sees every mutation committed after this call.
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<DomainEvent> {
        self.event_tx.subscribe()
    }

    fn emit_event(&self, event: DomainEvent) {
        tracing::debug!("Emitting {}", event.event_type());
        // No subscriber is fine
        let _ = self.event_tx.send(event);
    }

    /// Load every node and rebuild the ordered adjacency list
    pub async fn fetch_tree(&self) -> Result<Tree, TreeServiceError> {
        let nodes = self.store.load_nodes().await?;
        Ok(Tree::from_nodes(nodes))
    }

    /// Flatten the current tree and cut one page of it
    pub async fn list_page(
        &self,
        offset: i64,
        page_size: usize,
    ) -> Result<Page<FlatEntry>, TreeServiceError> {
        let tree = self.fetch_tree().await?;
        let flat = flatten(&tree);
        Ok(present_page(&flat, offset, page_size))
    }

    /// Append a node at the end of its parent's children
    ///
    /// # Errors
    ///
    /// - `Validation` for a malformed id or label, or an id already in use
    /// - `NotFound` when the parent does not exist
    pub async fn create_node(&self, new_node: NewNode) -> Result<Node, TreeServiceError> {
        let id = new_node
            .id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        validate_node_id(&id)?;
        if let Some(parent_id) = &new_node.parent_id {
            validate_node_id(parent_id)?;
        }
        let label = validate_label(&new_node.label, self.label_max_chars)?;
        let parent_id = new_node.parent_id.as_deref();

        self.store
            .apply_planned(Box::new(|mut tree| {
                tree.apply_insert(&id, parent_id, &label)
            }))
            .await?;

        // Re-read so the caller sees storage-maintained timestamps
        let created = self
            .store
            .get_node(&id)
            .await?
            .ok_or_else(|| TreeServiceError::not_found(&id))?;

        tracing::info!(
            "Created node {} at position {} (path {})",
            created.id,
            created.position,
            created.path
        );
        self.emit_event(DomainEvent::NodeCreated(created.clone()));

        Ok(created)
    }

    /// Replace a node's label; its path and position are untouched
    ///
    /// The id and label are validated before the store is touched.
    pub async fn rename(&self, id: &str, new_label: &str) -> Result<Node, TreeServiceError> {
        validate_node_id(id)?;
        let label = validate_label(new_label, self.label_max_chars)?;

        if !self.store.update_label(id, &label).await? {
            return Err(TreeServiceError::not_found(id));
        }

        let node = self
            .store
            .get_node(id)
            .await?
            .ok_or_else(|| TreeServiceError::not_found(id))?;

        tracing::info!("Renamed node {}", id);
        self.emit_event(DomainEvent::NodeRenamed {
            id: node.id.clone(),
            label: node.label.clone(),
        });

        Ok(node)
    }

    /// Delete a node with its whole subtree
    ///
    /// Later siblings shift down by one in the same transaction as the
    /// removal.
    ///
    /// # Returns
    ///
    /// The removed ids, subtree root first
    pub async fn delete(&self, id: &str) -> Result<Vec<String>, TreeServiceError> {
        validate_node_id(id)?;

        let changes = self
            .store
            .apply_planned(Box::new(|mut tree| tree.apply_delete(id)))
            .await?;

        tracing::info!(
            "Deleted subtree {} ({} node(s), {} sibling(s) shifted)",
            id,
            changes.removals.len(),
            changes.placements.len()
        );
        self.emit_event(DomainEvent::SubtreeDeleted {
            removed: changes.removals.clone(),
        });

        Ok(changes.removals)
    }

    /// Move a node under `new_parent_id` (`None` = root) at `new_position`
    ///
    /// `new_position` counts siblings as currently rendered, the moving node
    /// included. See [`Tree::apply_move`] for how it is adjusted and clamped.
    /// A move that changes nothing issues no write and no event.
    ///
    /// # Errors
    ///
    /// - `Cycle` when the new parent is the node itself or a descendant
    /// - `NotFound` when either id is absent
    /// - `Storage` when persisting fails; nothing is left applied
    pub async fn move_node(
        &self,
        id: &str,
        new_parent_id: Option<&str>,
        new_position: usize,
    ) -> Result<NodePlacement, TreeServiceError> {
        validate_node_id(id)?;
        if let Some(parent_id) = new_parent_id {
            validate_node_id(parent_id)?;
        }

        let mut placement = None;
        let changes = self
            .store
            .apply_planned(Box::new(|mut tree| {
                let changes = tree.apply_move(id, new_parent_id, new_position)?;
                placement = tree.get(id).map(NodePlacement::from);
                Ok(changes)
            }))
            .await?;
        let placement = placement.ok_or_else(|| TreeServiceError::not_found(id))?;

        if changes.is_empty() {
            tracing::debug!("Move of {} leaves the tree unchanged", id);
            return Ok(placement);
        }

        tracing::info!(
            "Moved node {} to {:?} at position {} ({} row(s) rewritten)",
            id,
            placement.parent_id,
            placement.position,
            changes.placements.len()
        );
        self.emit_event(DomainEvent::NodeMoved {
            placement: placement.clone(),
            affected: changes.placements.len(),
        });

        Ok(placement)
    }

    /// Flush the store
    pub async fn close(&self) -> Result<(), TreeServiceError> {
        self.store.close().await?;
        Ok(())
    }
}
