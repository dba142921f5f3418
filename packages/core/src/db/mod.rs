//! Database Layer
//!
//! This module handles all database interactions using libsql:
//!
//! - Database initialization and connection management
//! - The `tree_nodes` table (adjacency list with materialized paths)
//! - Read-plan-write transactions for structural tree changes
//! - Domain events broadcast after committed mutations
//!
//! Business logic never touches `DatabaseService` directly; it goes through
//! the [`NodeStore`] trait, implemented here by [`TursoStore`].

mod database;
mod error;
pub mod events;
mod node_store;
mod turso_store;

pub use database::DatabaseService;
pub use error::{DatabaseError, PlannedWriteError};
pub use events::DomainEvent;
pub use node_store::{NodeStore, TreePlanner};
pub use turso_store::TursoStore;
