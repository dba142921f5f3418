//! Drag-and-drop gesture interpretation
//!
//! - [`zone`] - Splits a hovered row into before/inside/after bands
//! - [`attributes`] - Reads tree shape back from rendered `data-*` attributes
//! - [`controller`] - Gesture state machine producing a [`MoveIntent`]
//! - [`client`] - Forwards intents to a [`TreeRepository`](crate::services::TreeRepository)
//!
//! Legality of a drop uses the same descendant-path test the repository uses,
//! so the controller never proposes a move the repository would refuse as a
//! cycle.

pub mod attributes;
pub mod client;
pub mod controller;
pub mod zone;

pub use attributes::{parse_list_items, AttributeError, RenderedNode};
pub use client::RepositoryClient;
pub use controller::{
    DragConfig, DragController, DragState, DropOutcome, InsertPolicy, MoveIntent, MutationClient,
};
pub use zone::{Bounds, HoverZone, ZoneConfig};
