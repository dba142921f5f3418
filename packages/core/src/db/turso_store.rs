//! TursoStore - NodeStore Implementation for Turso/libsql Backend
//!
//! TursoStore wraps `DatabaseService` and delegates every operation to the
//! matching `db_*` method. It carries no tree logic of its own.
//!
//! # Examples
//!
//! ```rust,no_run
//! use deftree_core::db::{NodeStore, TursoStore, DatabaseService};
//! use std::sync::Arc;
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = Arc::new(DatabaseService::new(PathBuf::from("./data/test.db")).await?);
//!     let store: Arc<dyn NodeStore> = Arc::new(TursoStore::new(db));
//!
//!     let node = store.get_node("node-123").await?;
//!     Ok(())
//! }
//! ```

use crate::db::node_store::{NodeStore, TreePlanner};
use crate::db::{DatabaseError, DatabaseService, PlannedWriteError};
use crate::models::{Node, TreeChanges};
use async_trait::async_trait;
use std::sync::Arc;

/// TursoStore implements NodeStore for the libsql backend
pub struct TursoStore {
    db: Arc<DatabaseService>,
}

impl TursoStore {
    /// Create a new TursoStore wrapper
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    /// Underlying database service
    pub fn database(&self) -> &Arc<DatabaseService> {
        &self.db
    }
}

#[async_trait]
impl NodeStore for TursoStore {
    async fn load_nodes(&self) -> Result<Vec<Node>, DatabaseError> {
        let nodes = self.db.db_load_nodes().await?;
        tracing::debug!("Loaded {} tree rows", nodes.len());
        Ok(nodes)
    }

    async fn get_node(&self, id: &str) -> Result<Option<Node>, DatabaseError> {
        self.db.db_get_node(id).await
    }

    async fn update_label(&self, id: &str, label: &str) -> Result<bool, DatabaseError> {
        let rows_affected = self.db.db_update_label(id, label).await?;
        Ok(rows_affected > 0)
    }

    async fn apply_planned<'a>(
        &self,
        planner: TreePlanner<'a>,
    ) -> Result<TreeChanges, PlannedWriteError> {
        let changes = self.db.db_apply_planned(planner).await?;
        tracing::debug!(
            "Committed {} insertion(s), {} placement(s) and {} removal(s)",
            changes.insertions.len(),
            changes.placements.len(),
            changes.removals.len()
        );
        Ok(changes)
    }

    async fn close(&self) -> Result<(), DatabaseError> {
        self.db.db_close().await
    }
}
