//! Tree Flattening
//!
//! Serializes the in-memory tree into the ordered, depth-annotated list the
//! rendered view and pagination work from, and provides the path-prefix test
//! used for every cycle check.

use crate::models::{FlatEntry, Tree, PATH_DELIMITER};

/// Pre-order depth-first listing of the whole tree
///
/// Roots come in position order, each followed immediately by its own
/// flattened subtree. Iterative, so deep trees do not grow the call stack.
/// Nodes whose parent is missing are unreachable and left out.
///
/// # Examples
///
/// ```rust
/// # use deftree_core::models::{Node, Tree};
/// # use deftree_core::services::flattener::flatten;
/// let root = Node::new("1", None, 0, "Root");
/// let child = Node::new("2", Some(&root), 0, "Child");
/// let tree = Tree::from_nodes(vec![child, root]);
///
/// let flat = flatten(&tree);
/// assert_eq!(flat[0].id, "1");
/// assert_eq!(flat[1].depth, 1);
/// ```
pub fn flatten(tree: &Tree) -> Vec<FlatEntry> {
    let mut entries = Vec::with_capacity(tree.len());
    let mut stack: Vec<&str> = tree.roots().iter().rev().map(String::as_str).collect();

    while let Some(id) = stack.pop() {
        let Some(node) = tree.get(id) else {
            continue;
        };
        entries.push(FlatEntry::from(node));
        stack.extend(tree.children_of(Some(id)).iter().rev().map(String::as_str));
    }

    entries
}

/// Whether `candidate_path` is `ancestor_path` itself or lies beneath it
///
/// Comparison happens on whole segments: `"1/2"` is not an ancestor of
/// `"1/20"`. An empty ancestor path never matches anything.
///
/// # Examples
///
/// ```rust
/// # use deftree_core::services::flattener::is_descendant_path;
/// assert!(is_descendant_path("1/2", "1/2"));
/// assert!(is_descendant_path("1/2", "1/2/9"));
/// assert!(!is_descendant_path("1/2", "1/20"));
/// assert!(!is_descendant_path("", "1"));
/// ```
pub fn is_descendant_path(ancestor_path: &str, candidate_path: &str) -> bool {
    if ancestor_path.is_empty() {
        return false;
    }

    match candidate_path.strip_prefix(ancestor_path) {
        Some(rest) => rest.is_empty() || rest.starts_with(PATH_DELIMITER),
        None => false,
    }
}
