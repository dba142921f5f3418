//! Domain Events for TreeRepository
//!
//! Events are emitted through a tokio broadcast channel after a mutation has
//! been committed, so subscribers never observe a change that was rolled back.
//! Sending with no subscriber is not an error.

use crate::models::{Node, NodePlacement};
use serde::Serialize;

/// Domain events emitted by TreeRepository
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DomainEvent {
    /// A node was appended to a sibling list
    #[serde(rename = "nodeCreated")]
    NodeCreated(Node),

    /// A node's label changed
    #[serde(rename = "nodeRenamed")]
    NodeRenamed { id: String, label: String },

    /// A node moved; `affected` counts every rewritten row, the node included
    #[serde(rename = "nodeMoved")]
    NodeMoved {
        placement: NodePlacement,
        affected: usize,
    },

    /// A subtree was removed, root first
    #[serde(rename = "subtreeDeleted")]
    SubtreeDeleted { removed: Vec<String> },
}

impl DomainEvent {
    /// Get a string representation of the event type
    pub fn event_type(&self) -> &str {
        match self {
            DomainEvent::NodeCreated(_) => "node:created",
            DomainEvent::NodeRenamed { .. } => "node:renamed",
            DomainEvent::NodeMoved { .. } => "node:moved",
            DomainEvent::SubtreeDeleted { .. } => "subtree:deleted",
        }
    }
}
