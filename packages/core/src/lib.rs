//! deftree Core
//!
//! Ordered tree of definitions and components: persistence, mutation,
//! flattened display, and drag-and-drop gesture interpretation.
//!
//! # Architecture
//!
//! - **Adjacency list + materialized path**: each row stores its parent, its
//!   sibling position, and the id chain from its root
//! - **Plan in memory, write once**: structural changes are computed on an
//!   owned [`Tree`] and persisted in a single transaction
//! - **libsql/Turso**: Embedded SQLite-compatible database
//!
//! # Modules
//!
//! - [`models`] - Node, flat entry and in-memory tree
//! - [`services`] - Tree repository, flattener and pagination
//! - [`db`] - Database layer with libsql integration
//! - [`drag`] - Drag gesture state machine
//! - [`api`] - HTTP adapter
//! - [`config`] - Environment-driven configuration

pub mod api;
pub mod config;
pub mod db;
pub mod drag;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::{ConfigError, TreeConfig};
pub use db::{DatabaseError, DatabaseService, DomainEvent, NodeStore, TursoStore};
pub use models::*;
pub use services::*;
