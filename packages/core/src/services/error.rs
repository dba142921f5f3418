//! Service Layer Error Types
//!
//! `TreeServiceError` is the single error type returned by `TreeRepository`.
//! Its four variants are the only outcomes callers need to distinguish.

use crate::db::{DatabaseError, PlannedWriteError};
use crate::models::{TreeError, ValidationError};
use thiserror::Error;

/// Repository operation errors
#[derive(Error, Debug)]
pub enum TreeServiceError {
    /// Input rejected before any storage access
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Referenced node (or parent) does not exist
    #[error("Node not found: {id}")]
    NotFound { id: String },

    /// Move would make a node its own ancestor
    #[error("Cannot move {node_id} under {parent_id}: target is the node or one of its descendants")]
    Cycle { node_id: String, parent_id: String },

    /// Storage was unreachable or a write failed and was rolled back
    #[error("Storage operation failed: {0}")]
    Storage(#[from] DatabaseError),
}

impl TreeServiceError {
    /// Create a not found error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Stable machine-readable code, used by the HTTP adapter
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NODE_NOT_FOUND",
            Self::Cycle { .. } => "CIRCULAR_MOVE",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl From<TreeError> for TreeServiceError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::NodeNotFound { id } => Self::NotFound { id },
            TreeError::CircularMove { node_id, parent_id } => Self::Cycle { node_id, parent_id },
            TreeError::DuplicateId { id } => Self::Validation(ValidationError::DuplicateId(id)),
            TreeError::ParentCycle { id } => {
                tracing::error!("Stored parent links loop through node {}", id);
                Self::Storage(DatabaseError::integrity_violation(format!(
                    "parent links form a cycle through node {}",
                    id
                )))
            }
        }
    }
}

impl From<PlannedWriteError> for TreeServiceError {
    fn from(err: PlannedWriteError) -> Self {
        match err {
            PlannedWriteError::Rejected(e) => e.into(),
            PlannedWriteError::Storage(e) => Self::Storage(e),
        }
    }
}
