//! Database Error Types
//!
//! This module defines error types for database operations, providing
//! clear error handling for connection, initialization, and query failures.

use crate::models::TreeError;
use std::path::PathBuf;
use thiserror::Error;

/// Database operation errors
///
/// Covers connection, initialization and statement failures. The repository
/// layer folds all of these into its single storage failure outcome.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish database connection
    #[error("Failed to connect to database at {path}: {source}")]
    ConnectionFailed {
        path: PathBuf,
        source: libsql::Error,
    },

    /// Failed to initialize database schema
    #[error("Failed to initialize database schema: {0}")]
    InitializationFailed(String),

    /// Permission denied when accessing database
    #[error("Permission denied for database path: {path}")]
    PermissionDenied { path: PathBuf },

    /// Failed to create parent directory
    #[error("Failed to create parent directory for database: {0}")]
    DirectoryCreationFailed(#[from] std::io::Error),

    /// libsql operation error
    #[error("Database operation failed: {0}")]
    LibsqlError(#[from] libsql::Error),

    /// SQL execution error with context
    #[error("SQL execution failed: {context}")]
    SqlExecutionError { context: String },

    /// A row expected by a multi-row write was gone when the write ran
    #[error("Row not found during write: {id}")]
    RowNotFound { id: String },

    /// Stored rows break a structural rule (e.g. looping parent links)
    #[error("Stored tree is inconsistent: {context}")]
    IntegrityViolation { context: String },
}

impl DatabaseError {
    /// Create a connection failed error
    pub fn connection_failed(path: PathBuf, source: libsql::Error) -> Self {
        Self::ConnectionFailed { path, source }
    }

    /// Create an initialization failed error
    pub fn initialization_failed(msg: impl Into<String>) -> Self {
        Self::InitializationFailed(msg.into())
    }

    /// Create a permission denied error
    pub fn permission_denied(path: PathBuf) -> Self {
        Self::PermissionDenied { path }
    }

    /// Create a SQL execution error with context
    pub fn sql_execution(context: impl Into<String>) -> Self {
        Self::SqlExecutionError {
            context: context.into(),
        }
    }

    /// Create a row not found error
    pub fn row_not_found(id: impl Into<String>) -> Self {
        Self::RowNotFound { id: id.into() }
    }

    /// Create an integrity violation error
    pub fn integrity_violation(context: impl Into<String>) -> Self {
        Self::IntegrityViolation {
            context: context.into(),
        }
    }
}

/// Failure of a read-plan-write transaction
///
/// Either way the transaction was rolled back and nothing is visible.
#[derive(Error, Debug)]
pub enum PlannedWriteError {
    /// The planner refused the change against the rows it read
    #[error(transparent)]
    Rejected(#[from] TreeError),

    #[error(transparent)]
    Storage(#[from] DatabaseError),
}
