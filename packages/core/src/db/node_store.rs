//! NodeStore Trait - Database Abstraction Layer
//!
//! This module defines the `NodeStore` trait that abstracts persistence of
//! tree rows. `TreeRepository` only talks to this trait, so tests can swap
//! in a store that fails on demand.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: All methods are async; the libsql backend is async
//! 2. **Plan inside the write**: Structural operations hand the store a
//!    [`TreePlanner`]; the store reads every row, runs the planner and writes
//!    its `TreeChanges` inside one write transaction, so the checks and the
//!    write see the same rows
//! 3. **Atomic writes**: a planned change is applied completely or not at all
//!
//! # Examples
//!
//! ```rust,no_run
//! use deftree_core::db::{NodeStore, TursoStore, DatabaseService};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = Arc::new(DatabaseService::new(PathBuf::from("./data/deftree.db")).await?);
//!     let store: Arc<dyn NodeStore> = Arc::new(TursoStore::new(db));
//!
//!     let changes = store
//!         .apply_planned(Box::new(|mut tree| tree.apply_insert("1", None, "Components")))
//!         .await?;
//!     assert_eq!(changes.insertions[0].path, "1");
//!     Ok(())
//! }
//! ```

use crate::db::{DatabaseError, PlannedWriteError};
use crate::models::{Node, Tree, TreeChanges, TreeError};
use async_trait::async_trait;

/// Computes a structural change from the tree as read inside the write
/// transaction
pub type TreePlanner<'a> = Box<dyn FnOnce(Tree) -> Result<TreeChanges, TreeError> + Send + 'a>;

/// Abstraction layer for tree row persistence
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow usage in async contexts where
/// futures may be moved between threads.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Load every stored row
    ///
    /// Order is unspecified; `Tree::from_nodes` sorts siblings by position.
    async fn load_nodes(&self) -> Result<Vec<Node>, DatabaseError>;

    /// Fetch one row by id
    async fn get_node(&self, id: &str) -> Result<Option<Node>, DatabaseError>;

    /// Replace a label, returning whether a row matched
    async fn update_label(&self, id: &str, label: &str) -> Result<bool, DatabaseError>;

    /// Read all rows, plan a change on them and persist it in one write
    /// transaction
    ///
    /// An empty plan writes nothing. On any error, including a planner
    /// rejection, no part of the change is visible to later reads.
    ///
    /// # Returns
    ///
    /// The changes that were committed
    async fn apply_planned<'a>(
        &self,
        planner: TreePlanner<'a>,
    ) -> Result<TreeChanges, PlannedWriteError>;

    /// Flush and release backend resources
    async fn close(&self) -> Result<(), DatabaseError>;
}
