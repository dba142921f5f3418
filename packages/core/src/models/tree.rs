//! In-Memory Tree
//!
//! `Tree` is the adjacency-list view of every stored node, rebuilt from the
//! store at the start of each repository operation and dropped at the end.
//! Moves and deletes are planned here against the owned tree, producing a
//! [`TreeChanges`] set that the repository persists in one transaction.
//!
//! Planning on the in-memory copy keeps the invariants checkable without a
//! database: [`Tree::check_invariants`] re-derives every path and position
//! from parent links.

use crate::models::node::{child_path, Node};
use crate::services::flattener::is_descendant_path;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

/// Errors raised while planning a structural change
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node not found: {id}")]
    NodeNotFound { id: String },

    #[error("Cannot move node {node_id} under {parent_id}: target is the node itself or one of its descendants")]
    CircularMove { node_id: String, parent_id: String },

    #[error("Node id already in use: {id}")]
    DuplicateId { id: String },

    /// Stored parent links loop; the rows need repair before any structural change
    #[error("Parent links form a cycle through node {id}")]
    ParentCycle { id: String },
}

impl TreeError {
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }

    pub fn circular_move(node_id: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self::CircularMove {
            node_id: node_id.into(),
            parent_id: parent_id.into(),
        }
    }

    pub fn parent_cycle(id: impl Into<String>) -> Self {
        Self::ParentCycle { id: id.into() }
    }
}

/// A structural inconsistency found by [`Tree::check_invariants`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Stored path differs from the one derived from parent links
    PathMismatch {
        id: String,
        expected: String,
        actual: String,
    },
    /// Sibling positions are not exactly `0..n` in display order
    PositionSequence {
        parent_id: Option<String>,
        positions: Vec<u32>,
    },
    /// Parent id refers to a node that does not exist
    MissingParent { id: String, parent_id: String },
    /// Following parent links from this node loops back on itself
    ParentCycle { id: String },
}

/// New parent/position/path of one row, as written by a structural change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePlacement {
    pub id: String,
    pub parent_id: Option<String>,
    pub position: u32,
    pub path: String,
}

/// Row-level changes produced by a create, move or delete
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeChanges {
    /// New rows
    pub insertions: Vec<Node>,
    /// Rows whose parent, position or path changed (ordered by id)
    pub placements: Vec<NodePlacement>,
    /// Rows removed, in pre-order (subtree root first)
    pub removals: Vec<String>,
}

impl TreeChanges {
    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty() && self.placements.is_empty() && self.removals.is_empty()
    }
}

fn as_position(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

fn parent_key(parent_id: Option<&str>) -> Option<String> {
    parent_id.map(str::to_string)
}

/// Parent → ordered children adjacency over all nodes
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: HashMap<String, Node>,
    children: HashMap<Option<String>, Vec<String>>,
}

impl Tree {
    /// Build the adjacency list, ordering each sibling group by position
    ///
    /// Ties on position (which only a corrupted store can produce) are broken
    /// by id so that loading stays deterministic.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        let mut children: HashMap<Option<String>, Vec<(u32, String)>> = HashMap::new();
        let mut by_id = HashMap::with_capacity(nodes.len());

        for node in nodes {
            children
                .entry(node.parent_id.clone())
                .or_default()
                .push((node.position, node.id.clone()));
            by_id.insert(node.id.clone(), node);
        }

        let children = children
            .into_iter()
            .map(|(parent, mut siblings)| {
                siblings.sort();
                if let Some(parent_id) = &parent {
                    if !by_id.contains_key(parent_id) {
                        tracing::warn!(
                            "{} node(s) reference missing parent {}",
                            siblings.len(),
                            parent_id
                        );
                    }
                }
                (parent, siblings.into_iter().map(|(_, id)| id).collect())
            })
            .collect();

        Self {
            nodes: by_id,
            children,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// All nodes, in no particular order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Ordered child ids of `parent_id` (`None` = top level)
    pub fn children_of(&self, parent_id: Option<&str>) -> &[String] {
        self.children
            .get(&parent_key(parent_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Ordered top-level ids
    pub fn roots(&self) -> &[String] {
        self.children_of(None)
    }

    /// Position a new last child of `parent_id` would take
    pub fn next_position(&self, parent_id: Option<&str>) -> u32 {
        as_position(self.children_of(parent_id).len())
    }

    /// Ids of `id` and all its descendants in pre-order
    ///
    /// # Errors
    ///
    /// `ParentCycle` when a node is reached twice, which only stored parent
    /// links that loop back into the subtree can cause.
    pub fn subtree_ids(&self, id: &str) -> Result<Vec<String>, TreeError> {
        let mut ordered = Vec::new();
        if !self.contains(id) {
            return Ok(ordered);
        }

        let mut visited = HashSet::new();
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                return Err(TreeError::parent_cycle(current));
            }
            // Push in reverse so the first child is visited first
            for child in self.children_of(Some(&current)).iter().rev() {
                stack.push(child.clone());
            }
            ordered.push(current);
        }
        Ok(ordered)
    }

    /// Re-derive paths and sibling positions from parent links
    ///
    /// Returns every violation found, so a test failure shows the whole
    /// picture rather than the first symptom.
    pub fn check_invariants(&self) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        for node in self.nodes.values() {
            match self.derive_path(node) {
                Ok(expected) if expected != node.path => {
                    violations.push(InvariantViolation::PathMismatch {
                        id: node.id.clone(),
                        expected,
                        actual: node.path.clone(),
                    });
                }
                Ok(_) => {}
                Err(violation) => violations.push(violation),
            }
        }

        for (parent, siblings) in &self.children {
            let positions: Vec<u32> = siblings
                .iter()
                .filter_map(|id| self.nodes.get(id))
                .map(|n| n.position)
                .collect();
            let contiguous = positions
                .iter()
                .enumerate()
                .all(|(index, position)| as_position(index) == *position);
            if !contiguous || positions.len() != siblings.len() {
                violations.push(InvariantViolation::PositionSequence {
                    parent_id: parent.clone(),
                    positions,
                });
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    fn derive_path(&self, node: &Node) -> Result<String, InvariantViolation> {
        let mut segments = vec![node.id.as_str()];
        let mut seen = HashSet::from([node.id.as_str()]);
        let mut current = node;

        while let Some(parent_id) = current.parent_id.as_deref() {
            let parent =
                self.nodes
                    .get(parent_id)
                    .ok_or_else(|| InvariantViolation::MissingParent {
                        id: current.id.clone(),
                        parent_id: parent_id.to_string(),
                    })?;
            if !seen.insert(parent.id.as_str()) {
                return Err(InvariantViolation::ParentCycle {
                    id: node.id.clone(),
                });
            }
            segments.push(parent.id.as_str());
            current = parent;
        }

        segments.reverse();
        Ok(segments.iter().fold(String::new(), |path, id| {
            if path.is_empty() {
                id.to_string()
            } else {
                child_path(Some(&path), id)
            }
        }))
    }

    /// Reassign positions `0..n` along a sibling list, recording changed rows
    fn renumber(&mut self, parent: &Option<String>, changes: &mut BTreeMap<String, NodePlacement>) {
        let Some(siblings) = self.children.get(parent) else {
            return;
        };

        for (index, id) in siblings.iter().enumerate() {
            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            let position = as_position(index);
            if node.position != position {
                node.position = position;
                changes.insert(id.clone(), NodePlacement::from(&*node));
            }
        }
    }

    /// Move `id` under `new_parent_id` at `position`, cascading paths
    ///
    /// `position` is read against the sibling list as it looks before the
    /// node is taken out. When the node stays under the same parent and the
    /// target lies past its old slot, removal already shifted the target
    /// down by one, so the index is adjusted before clamping to
    /// `[0, len(children)]`.
    ///
    /// A move that lands the node where it already is returns empty changes.
    pub fn apply_move(
        &mut self,
        id: &str,
        new_parent_id: Option<&str>,
        position: usize,
    ) -> Result<TreeChanges, TreeError> {
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| TreeError::node_not_found(id))?;
        let old_path = node.path.clone();
        let old_parent = node.parent_id.clone();

        let new_parent_path = match new_parent_id {
            Some(parent_id) => {
                if parent_id == id {
                    return Err(TreeError::circular_move(id, parent_id));
                }
                let parent = self
                    .nodes
                    .get(parent_id)
                    .ok_or_else(|| TreeError::node_not_found(parent_id))?;
                if is_descendant_path(&old_path, &parent.path) {
                    return Err(TreeError::circular_move(id, parent_id));
                }
                Some(parent.path.clone())
            }
            None => None,
        };
        let subtree = self.subtree_ids(id)?;
        if let Some(parent_id) = new_parent_id {
            if subtree.iter().any(|member| member == parent_id) {
                return Err(TreeError::circular_move(id, parent_id));
            }
        }

        let new_parent = parent_key(new_parent_id);
        let same_parent = old_parent == new_parent;
        let mut changes = BTreeMap::new();

        // 1. Take the node out of its current sibling list
        let old_siblings = self.children.entry(old_parent.clone()).or_default();
        let old_index = old_siblings.iter().position(|sibling| sibling == id);
        if let Some(index) = old_index {
            old_siblings.remove(index);
        }

        // 2. Translate the rendered position into the post-removal list
        let mut target = position;
        if same_parent && old_index.is_some_and(|index| target > index) {
            target -= 1;
        }
        let new_siblings = self.children.entry(new_parent.clone()).or_default();
        let target = target.min(new_siblings.len());

        // 3. Insert and close both gaps
        new_siblings.insert(target, id.to_string());
        if !same_parent {
            self.renumber(&old_parent, &mut changes);
            if self.children.get(&old_parent).is_some_and(Vec::is_empty) {
                self.children.remove(&old_parent);
            }
        }
        self.renumber(&new_parent, &mut changes);

        // 4. Recompute the moved node's own path
        let new_path = child_path(new_parent_path.as_deref(), id);
        if let Some(node) = self.nodes.get_mut(id) {
            if node.parent_id != new_parent || node.path != new_path {
                node.parent_id = new_parent.clone();
                node.path = new_path.clone();
                changes.insert(id.to_string(), NodePlacement::from(&*node));
            }
        }

        // 5. Rewrite descendant paths; pre-order means each parent is already done
        if new_path != old_path {
            for descendant in subtree.into_iter().skip(1) {
                let parent_path = self
                    .nodes
                    .get(&descendant)
                    .and_then(|node| node.parent_id.as_deref())
                    .and_then(|parent_id| self.nodes.get(parent_id))
                    .map(|parent| parent.path.clone());
                if let Some(node) = self.nodes.get_mut(&descendant) {
                    node.path = child_path(parent_path.as_deref(), &descendant);
                    changes.insert(descendant, NodePlacement::from(&*node));
                }
            }
        }

        Ok(TreeChanges {
            placements: changes.into_values().collect(),
            ..TreeChanges::default()
        })
    }

    /// Remove `id` and its whole subtree, shifting later siblings down
    pub fn apply_delete(&mut self, id: &str) -> Result<TreeChanges, TreeError> {
        let parent = self
            .nodes
            .get(id)
            .ok_or_else(|| TreeError::node_not_found(id))?
            .parent_id
            .clone();

        let removals = self.subtree_ids(id)?;
        if let Some(siblings) = self.children.get_mut(&parent) {
            siblings.retain(|sibling| sibling != id);
        }
        for removed in &removals {
            self.nodes.remove(removed);
            self.children.remove(&Some(removed.clone()));
        }

        let mut changes = BTreeMap::new();
        self.renumber(&parent, &mut changes);

        Ok(TreeChanges {
            placements: changes.into_values().collect(),
            removals,
            ..TreeChanges::default()
        })
    }

    /// Append a new node as the last child of `parent_id`
    pub fn apply_insert(
        &mut self,
        id: &str,
        parent_id: Option<&str>,
        label: &str,
    ) -> Result<TreeChanges, TreeError> {
        if self.contains(id) {
            return Err(TreeError::DuplicateId { id: id.to_string() });
        }
        let parent = match parent_id {
            Some(parent_id) => Some(
                self.nodes
                    .get(parent_id)
                    .ok_or_else(|| TreeError::node_not_found(parent_id))?,
            ),
            None => None,
        };

        let node = Node::new(id, parent, self.next_position(parent_id), label);
        self.children
            .entry(parent_key(parent_id))
            .or_default()
            .push(id.to_string());
        self.nodes.insert(id.to_string(), node.clone());

        Ok(TreeChanges {
            insertions: vec![node],
            ..TreeChanges::default()
        })
    }
}

impl From<&Node> for NodePlacement {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            parent_id: node.parent_id.clone(),
            position: node.position,
            path: node.path.clone(),
        }
    }
}
