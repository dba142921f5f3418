//! Business Services
//!
//! - `TreeRepository` - Load, create, rename, delete and move tree nodes
//! - `flattener` - Depth-first listing and descendant-path checks
//! - `pagination` - Fixed-size pages with clamped offsets
//!
//! Services coordinate between the database layer and the HTTP adapter,
//! enforcing the tree invariants on every mutation.

pub mod error;
pub mod flattener;
pub mod pagination;
pub mod tree_repository;

pub use error::TreeServiceError;
pub use flattener::{flatten, is_descendant_path};
pub use pagination::{clamp_offset, present_page, Page};
pub use tree_repository::{NewNode, TreeRepository};
