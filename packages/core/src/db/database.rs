//! Database Connection Management
//!
//! This module provides the database connection, schema initialization and
//! the SQL behind every tree operation, using libsql as an embedded store.
//!
//! # Architecture
//!
//! - **Path-agnostic**: Accepts any valid PathBuf
//! - **Adjacency list + materialized path**: One `tree_nodes` row per node
//! - **WAL mode**: Write-Ahead Logging for better concurrency
//! - **Explicit transactions**: Structural changes read, plan and write inside
//!   one `BEGIN IMMEDIATE`/`COMMIT` on a single connection
//!
//! # Database Connection Patterns
//!
//! **Use `connect_with_timeout()` in async functions.** The 5-second busy
//! timeout lets concurrent operations wait and retry instead of failing
//! immediately with `SQLITE_BUSY`.
//!
//! ```no_run
//! # use deftree_core::db::DatabaseService;
//! # use std::path::PathBuf;
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let db_service = DatabaseService::new(PathBuf::from("./data/deftree.db")).await?;
//! let conn = db_service.connect_with_timeout().await?;
//! # Ok(())
//! # }
//! ```

use crate::db::error::{DatabaseError, PlannedWriteError};
use crate::db::node_store::TreePlanner;
use crate::models::{Node, Tree, TreeChanges};
use chrono::{DateTime, NaiveDateTime, Utc};
use libsql::{Builder, Database, Value};
use std::path::PathBuf;
use std::sync::Arc;

const NODE_COLUMNS: &str = "id, parent_id, position, label, path, created_at, modified_at";

/// Database service for managing the libsql connection and schema
///
/// # Examples
///
/// ```no_run
/// use deftree_core::db::DatabaseService;
/// use std::path::PathBuf;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let db_path = PathBuf::from("/path/to/deftree.db");
///     let db_service = DatabaseService::new(db_path).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseService {
    /// libsql database handle (wrapped in Arc for sharing)
    pub db: Arc<Database>,

    /// Path to the database file
    pub db_path: PathBuf,
}

impl DatabaseService {
    /// Create a new DatabaseService with the specified database path
    ///
    /// This will:
    /// 1. Ensure the parent directory exists (create if needed)
    /// 2. Open/create the database file
    /// 3. Initialize the schema (CREATE TABLE IF NOT EXISTS)
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the parent directory cannot be created, the
    /// connection fails or schema initialization fails.
    pub async fn new(db_path: PathBuf) -> Result<Self, DatabaseError> {
        let is_new_database = !db_path.exists();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::PermissionDenied {
                        DatabaseError::permission_denied(db_path.clone())
                    } else {
                        DatabaseError::DirectoryCreationFailed(e)
                    }
                })?;
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| DatabaseError::connection_failed(db_path.clone(), e))?;

        let service = Self {
            db: Arc::new(db),
            db_path,
        };

        service.initialize_schema(is_new_database).await?;

        Ok(service)
    }

    /// Execute a PRAGMA statement
    ///
    /// PRAGMA statements return rows, so they go through query() instead of execute().
    async fn execute_pragma(
        &self,
        conn: &libsql::Connection,
        pragma: &str,
    ) -> Result<(), DatabaseError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    /// Initialize database schema and configuration
    ///
    /// Idempotent. A freshly created file gets a WAL checkpoint so the schema
    /// is on disk before the first writer arrives.
    ///
    /// # Schema
    ///
    /// - `tree_nodes`: one row per node; `position` is constrained non-negative
    /// - Indexes: `(parent_id, position)` for sibling scans, `path` for prefix scans
    async fn initialize_schema(&self, is_new_database: bool) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        self.execute_pragma(&conn, "PRAGMA journal_mode = WAL")
            .await?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS tree_nodes (
                id TEXT PRIMARY KEY,
                parent_id TEXT,
                position INTEGER NOT NULL CHECK (position >= 0),
                label TEXT NOT NULL,
                path TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                modified_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::initialization_failed(format!(
                "Failed to create tree_nodes table: {}",
                e
            ))
        })?;

        self.create_core_indexes(&conn).await?;

        if is_new_database {
            self.execute_pragma(&conn, "PRAGMA wal_checkpoint(TRUNCATE)")
                .await?;
        }

        Ok(())
    }

    async fn create_core_indexes(&self, conn: &libsql::Connection) -> Result<(), DatabaseError> {
        let indexes = [
            (
                "idx_tree_nodes_parent",
                "CREATE INDEX IF NOT EXISTS idx_tree_nodes_parent ON tree_nodes(parent_id, position)",
            ),
            (
                "idx_tree_nodes_path",
                "CREATE INDEX IF NOT EXISTS idx_tree_nodes_path ON tree_nodes(path)",
            ),
        ];

        for (name, sql) in indexes {
            conn.execute(sql, ()).await.map_err(|e| {
                DatabaseError::initialization_failed(format!(
                    "Failed to create index {}: {}",
                    name, e
                ))
            })?;
        }

        Ok(())
    }

    /// Get a raw connection without busy timeout
    ///
    /// Only for synchronous, single-threaded contexts. Async code should use
    /// [`connect_with_timeout`](Self::connect_with_timeout).
    pub fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        self.db.connect().map_err(DatabaseError::LibsqlError)
    }

    /// Get an async connection with a 5-second busy timeout configured
    pub async fn connect_with_timeout(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self.connect()?;

        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000")
            .await?;

        Ok(conn)
    }

    //
    // NODE STORE OPERATIONS
    // Wrapped by the NodeStore trait implementation in turso_store.rs.
    //

    /// Load every row, ordered by parent then position
    pub async fn db_load_nodes(&self) -> Result<Vec<Node>, DatabaseError> {
        let conn = self.connect_with_timeout().await?;
        Self::load_nodes_in(&conn).await
    }

    /// Load every row on an existing connection (and its open transaction)
    async fn load_nodes_in(conn: &libsql::Connection) -> Result<Vec<Node>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM tree_nodes ORDER BY parent_id, position, id",
            NODE_COLUMNS
        );

        let mut stmt = conn.prepare(&sql).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to prepare load query: {}", e))
        })?;
        let mut rows = stmt.query(()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute load query: {}", e))
        })?;

        // Rows must be converted while the cursor sits on them
        let mut nodes = Vec::new();
        while let Some(row) = rows.next().await? {
            nodes.push(node_from_row(&row)?);
        }

        Ok(nodes)
    }

    /// Fetch a single row by id
    pub async fn db_get_node(&self, id: &str) -> Result<Option<Node>, DatabaseError> {
        let conn = self.connect_with_timeout().await?;
        let sql = format!("SELECT {} FROM tree_nodes WHERE id = ?", NODE_COLUMNS);

        let mut stmt = conn.prepare(&sql).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to prepare get query: {}", e))
        })?;
        let mut rows = stmt.query([id]).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute get query: {}", e))
        })?;

        match rows.next().await? {
            Some(row) => Ok(Some(node_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Update a label, returning the number of rows touched (0 or 1)
    pub async fn db_update_label(&self, id: &str, label: &str) -> Result<u64, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let rows_affected = conn
            .execute(
                "UPDATE tree_nodes SET label = ?, modified_at = CURRENT_TIMESTAMP WHERE id = ?",
                (label, id),
            )
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to update label of {}: {}", id, e))
            })?;

        Ok(rows_affected)
    }

    /// Read, plan and write a structural change in one write transaction
    ///
    /// `BEGIN IMMEDIATE` takes the write lock before the rows are read, so
    /// the planner's checks and the write see the same state; a concurrent
    /// writer waits on the busy timeout. Removals are deleted, insertions
    /// added, then every placement rewrites parent, position and path. A
    /// placement that matches no row aborts the whole change, as does a
    /// planner rejection or any statement failure; either way nothing is
    /// left applied.
    pub async fn db_apply_planned(
        &self,
        planner: TreePlanner<'_>,
    ) -> Result<TreeChanges, PlannedWriteError> {
        let conn = self.connect_with_timeout().await?;

        conn.execute("BEGIN IMMEDIATE", ()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to begin transaction: {}", e))
        })?;

        let changes = match Self::plan_and_write(&conn, planner).await {
            Ok(changes) => changes,
            Err(e) => {
                let _rollback = conn.execute("ROLLBACK", ()).await;
                return Err(e);
            }
        };

        if let Err(e) = conn.execute("COMMIT", ()).await {
            let _rollback = conn.execute("ROLLBACK", ()).await;
            return Err(DatabaseError::sql_execution(format!(
                "Failed to commit transaction: {}",
                e
            ))
            .into());
        }

        Ok(changes)
    }

    async fn plan_and_write(
        conn: &libsql::Connection,
        planner: TreePlanner<'_>,
    ) -> Result<TreeChanges, PlannedWriteError> {
        let nodes = Self::load_nodes_in(conn).await?;
        let changes = planner(Tree::from_nodes(nodes))?;
        if !changes.is_empty() {
            Self::write_changes(conn, &changes).await?;
        }
        Ok(changes)
    }

    async fn write_changes(
        conn: &libsql::Connection,
        changes: &TreeChanges,
    ) -> Result<(), DatabaseError> {
        for id in &changes.removals {
            conn.execute("DELETE FROM tree_nodes WHERE id = ?", [id.as_str()])
                .await
                .map_err(|e| {
                    DatabaseError::sql_execution(format!("Failed to delete node {}: {}", id, e))
                })?;
        }

        for node in &changes.insertions {
            conn.execute(
                "INSERT INTO tree_nodes (id, parent_id, position, label, path) VALUES (?, ?, ?, ?, ?)",
                (
                    node.id.as_str(),
                    node.parent_id.as_deref(),
                    i64::from(node.position),
                    node.label.as_str(),
                    node.path.as_str(),
                ),
            )
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to insert node {}: {}", node.id, e))
            })?;
        }

        for placement in &changes.placements {
            let rows_affected = conn
                .execute(
                    "UPDATE tree_nodes
                     SET parent_id = ?, position = ?, path = ?, modified_at = CURRENT_TIMESTAMP
                     WHERE id = ?",
                    (
                        placement.parent_id.as_deref(),
                        i64::from(placement.position),
                        placement.path.as_str(),
                        placement.id.as_str(),
                    ),
                )
                .await
                .map_err(|e| {
                    DatabaseError::sql_execution(format!(
                        "Failed to update placement of {}: {}",
                        placement.id, e
                    ))
                })?;

            if rows_affected == 0 {
                return Err(DatabaseError::row_not_found(placement.id.clone()));
            }
        }

        Ok(())
    }

    /// Checkpoint the WAL so every write is in the main database file
    ///
    /// Call before shutdown or before handing the file to another process.
    pub async fn db_close(&self) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;
        self.execute_pragma(&conn, "PRAGMA wal_checkpoint(TRUNCATE)")
            .await?;
        Ok(())
    }
}

/// Parse timestamp from the database
///
/// Accepts SQLite's `CURRENT_TIMESTAMP` format and RFC3339.
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    Err(DatabaseError::sql_execution(format!(
        "Unable to parse timestamp '{}' as SQLite or RFC3339 format",
        s
    )))
}

/// Convert a `tree_nodes` row (in `NODE_COLUMNS` order) to a Node
fn node_from_row(row: &libsql::Row) -> Result<Node, DatabaseError> {
    let id: String = row.get(0)?;

    let parent_id = match row.get_value(1)? {
        Value::Text(parent_id) => Some(parent_id),
        Value::Null => None,
        other => {
            return Err(DatabaseError::sql_execution(format!(
                "Unexpected parent_id value {:?} for node {}",
                other, id
            )))
        }
    };

    let position: i64 = row.get(2)?;
    let position = u32::try_from(position).map_err(|_| {
        DatabaseError::sql_execution(format!("Invalid position {} for node {}", position, id))
    })?;

    let label: String = row.get(3)?;
    let path: String = row.get(4)?;
    let created_at: String = row.get(5)?;
    let modified_at: String = row.get(6)?;

    Ok(Node {
        id,
        parent_id,
        position,
        label,
        path,
        created_at: parse_timestamp(&created_at)?,
        modified_at: parse_timestamp(&modified_at)?,
    })
}
