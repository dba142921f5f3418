//! Data Models
//!
//! - `Node` - Persisted tree row (id, parent, position, label, path)
//! - `FlatEntry` - Depth-annotated display row produced by the flattener
//! - `Tree` - In-memory adjacency list owned by one repository operation

mod node;
mod tree;

pub use node::{
    child_path, is_valid_node_id, path_depth, validate_label, validate_node_id, FlatEntry, Node,
    ValidationError, DEFAULT_LABEL_MAX_CHARS, PATH_DELIMITER,
};
pub use tree::{InvariantViolation, NodePlacement, Tree, TreeChanges, TreeError};
