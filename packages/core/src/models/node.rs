//! Node Data Structures
//!
//! This module defines the persisted `Node` row and the display-only
//! `FlatEntry`, together with the identifier, label and materialized-path
//! rules every layer shares.
//!
//! # Materialized Paths
//!
//! A node's `path` is its parent's path, the [`PATH_DELIMITER`], then the
//! node's own id. Root nodes have `path == id`. Paths are derived data: only
//! the tree repository writes them, always from the live parent chain.
//!
//! # Examples
//!
//! ```rust
//! use deftree_core::models::{child_path, path_depth};
//!
//! let root = child_path(None, "1");
//! let child = child_path(Some(&root), "2");
//! assert_eq!(child, "1/2");
//! assert_eq!(path_depth(&child), 1);
//! ```

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

/// Separator between ids in a materialized path
pub const PATH_DELIMITER: char = '/';

/// Default upper bound on label length, in Unicode code points
pub const DEFAULT_LABEL_MAX_CHARS: usize = 191;

/// Identifier grammar: 1-64 characters from `[A-Za-z0-9_-]`.
///
/// UUID v4 strings and plain integers both match; the path delimiter never does.
const NODE_ID_PATTERN: &str = r"^[A-Za-z0-9_-]{1,64}$";

/// Validation errors raised before any storage access
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid node ID format: {0:?}")]
    InvalidId(String),

    #[error("Label must not be empty")]
    EmptyLabel,

    #[error("Label is {length} characters long, the maximum is {max}")]
    LabelTooLong { length: usize, max: usize },

    #[error("Node ID already exists: {0}")]
    DuplicateId(String),
}

/// Check an identifier against the node id grammar
///
/// # Examples
///
/// ```
/// # use deftree_core::models::is_valid_node_id;
/// assert!(is_valid_node_id("550e8400-e29b-41d4-a716-446655440000"));
/// assert!(is_valid_node_id("42"));
/// assert!(!is_valid_node_id("1/2"));
/// assert!(!is_valid_node_id(""));
/// ```
pub fn is_valid_node_id(node_id: &str) -> bool {
    static ID_REGEX: OnceLock<Regex> = OnceLock::new();
    let id_regex = ID_REGEX.get_or_init(|| {
        Regex::new(NODE_ID_PATTERN).expect("node id pattern is a valid regex")
    });
    id_regex.is_match(node_id)
}

/// Reject malformed identifiers
pub fn validate_node_id(node_id: &str) -> Result<(), ValidationError> {
    if is_valid_node_id(node_id) {
        Ok(())
    } else {
        Err(ValidationError::InvalidId(node_id.to_string()))
    }
}

/// Validate a label and return the trimmed form that gets stored
///
/// Length is counted in code points, not bytes, so `"é"` counts as one.
pub fn validate_label(label: &str, max_chars: usize) -> Result<String, ValidationError> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyLabel);
    }

    let length = trimmed.chars().count();
    if length > max_chars {
        return Err(ValidationError::LabelTooLong {
            length,
            max: max_chars,
        });
    }

    Ok(trimmed.to_string())
}

/// Build the materialized path of `id` under a parent path (`None` = root)
pub fn child_path(parent_path: Option<&str>, id: &str) -> String {
    match parent_path {
        Some(parent) => format!("{}{}{}", parent, PATH_DELIMITER, id),
        None => id.to_string(),
    }
}

/// Depth of a path: number of segments minus one (roots are depth 0)
pub fn path_depth(path: &str) -> usize {
    path.matches(PATH_DELIMITER).count()
}

/// One persisted tree node.
///
/// # Fields
///
/// - `id`: Unique identifier (see [`is_valid_node_id`])
/// - `parent_id`: Parent node, `None` for roots
/// - `position`: 0-based rank among siblings
/// - `label`: Display label (the definition or component title)
/// - `path`: Materialized ancestor chain ending in `id`
/// - `created_at` / `modified_at`: Storage-maintained timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,

    pub parent_id: Option<String>,

    pub position: u32,

    pub label: String,

    pub path: String,

    pub created_at: DateTime<Utc>,

    pub modified_at: DateTime<Utc>,
}

impl Node {
    /// Create a node positioned under `parent` (or at root), deriving its path
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use deftree_core::models::Node;
    /// let root = Node::new("1", None, 0, "Components");
    /// let child = Node::new("2", Some(&root), 0, "Button");
    /// assert_eq!(child.path, "1/2");
    /// assert_eq!(child.parent_id.as_deref(), Some("1"));
    /// ```
    pub fn new(
        id: impl Into<String>,
        parent: Option<&Node>,
        position: u32,
        label: impl Into<String>,
    ) -> Self {
        let id = id.into();
        let now = Utc::now();
        Self {
            path: child_path(parent.map(|p| p.path.as_str()), &id),
            parent_id: parent.map(|p| p.id.clone()),
            id,
            position,
            label: label.into(),
            created_at: now,
            modified_at: now,
        }
    }

    /// Whether this node sits at the top level
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Depth derived from the materialized path
    pub fn depth(&self) -> usize {
        path_depth(&self.path)
    }
}

/// Depth-annotated entry of a flattened tree, produced fresh for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatEntry {
    pub id: String,
    pub parent_id: Option<String>,
    pub position: u32,
    pub path: String,
    pub depth: usize,
    pub label: String,
}

impl From<&Node> for FlatEntry {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            parent_id: node.parent_id.clone(),
            position: node.position,
            path: node.path.clone(),
            depth: node.depth(),
            label: node.label.clone(),
        }
    }
}
