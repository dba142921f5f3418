//! Drag gesture state machine
//!
//! ```text
//! Idle ──begin──▶ Dragging ──hover──▶ Hovering ──drop──▶ Applied ──end──▶ Idle
//!                    ▲                   │  │
//!                    └──────leave────────┘  └──cancel / invalid drop──▶ Cancelled ──end──▶ Idle
//! ```
//!
//! The controller reads tree shape only from [`RenderedNode`]s and never
//! touches storage. A successful drop produces one [`MoveIntent`] and hands it
//! to a [`MutationClient`]; whatever happens to the request afterwards is not
//! tracked here.

use crate::drag::attributes::RenderedNode;
use crate::drag::zone::{Bounds, HoverZone, ZoneConfig};
use crate::services::flattener::is_descendant_path;
use serde::{Deserialize, Serialize};

/// Target parent and rendered position for a dragged node
///
/// `position` counts siblings as rendered, the dragged node included; the
/// repository accounts for the gap the node leaves behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveIntent {
    pub id: String,
    pub parent_id: Option<String>,
    pub position: u32,
}

/// Receiver of move requests
///
/// Fire-and-forget: implementations must not block the gesture.
pub trait MutationClient {
    fn request_move(&mut self, intent: MoveIntent);
}

/// Where an `Inside` drop places the node among the candidate's children
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPolicy {
    /// After the last rendered child
    #[default]
    Append,
    /// Before the first child
    Prepend,
}

/// Controller settings
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragConfig {
    pub zones: ZoneConfig,
    pub insert_policy: InsertPolicy,
}

impl DragConfig {
    pub fn with_zones(mut self, zones: ZoneConfig) -> Self {
        self.zones = zones;
        self
    }

    pub fn with_insert_policy(mut self, insert_policy: InsertPolicy) -> Self {
        self.insert_policy = insert_policy;
        self
    }
}

/// Gesture state
#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    Dragging {
        dragged: RenderedNode,
    },
    Hovering {
        dragged: RenderedNode,
        candidate: RenderedNode,
        zone: HoverZone,
    },
    /// Drop accepted; `intent` is `None` when the drop changed nothing
    Applied {
        intent: Option<MoveIntent>,
    },
    Cancelled,
}

impl DragState {
    /// Whether a gesture is in progress (dragging or hovering)
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Dragging { .. } | Self::Hovering { .. })
    }

    fn dragged(&self) -> Option<&RenderedNode> {
        match self {
            Self::Dragging { dragged } | Self::Hovering { dragged, .. } => Some(dragged),
            _ => None,
        }
    }
}

/// Result of [`DragController::drop`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The mutation client received this intent
    Requested(MoveIntent),
    /// Valid drop that would leave the node where it is; nothing sent
    Unchanged,
    /// No valid zone under the pointer; nothing sent
    Cancelled,
    /// Drop without a live gesture
    Ignored,
}

/// Turns pointer events over the rendered list into move requests
#[derive(Debug, Clone)]
pub struct DragController {
    config: DragConfig,
    state: DragState,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(DragConfig::default())
    }
}

impl DragController {
    pub fn new(config: DragConfig) -> Self {
        Self {
            config,
            state: DragState::Idle,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    /// Row and zone to draw a drop indicator for, if any
    pub fn indicator(&self) -> Option<(&str, HoverZone)> {
        match &self.state {
            DragState::Hovering {
                candidate, zone, ..
            } if zone.is_valid() => Some((candidate.id.as_str(), *zone)),
            _ => None,
        }
    }

    /// Start dragging `dragged`, discarding any stale gesture
    pub fn begin(&mut self, dragged: RenderedNode) {
        if self.state.is_live() {
            tracing::debug!("Discarding stale drag gesture");
        }
        self.state = DragState::Dragging { dragged };
    }

    /// Pointer is over `candidate` at `pointer_y`
    ///
    /// Returns `Invalid` when the candidate is the dragged node or lies in
    /// its subtree; the gesture stays alive but a drop there does nothing.
    /// Outside a live gesture this is a no-op that reports `Invalid`.
    pub fn hover(&mut self, candidate: RenderedNode, bounds: Bounds, pointer_y: f64) -> HoverZone {
        let Some(dragged) = self.state.dragged().cloned() else {
            return HoverZone::Invalid;
        };

        let zone = if candidate.id == dragged.id || is_descendant_path(&dragged.path, &candidate.path)
        {
            HoverZone::Invalid
        } else {
            self.config.zones.classify(bounds, pointer_y)
        };

        self.state = DragState::Hovering {
            dragged,
            candidate,
            zone,
        };
        zone
    }

    /// Pointer left the hovered row
    pub fn leave(&mut self) {
        if let DragState::Hovering { dragged, .. } = &self.state {
            self.state = DragState::Dragging {
                dragged: dragged.clone(),
            };
        }
    }

    /// Release over the current zone
    ///
    /// `rendered` is the list as currently displayed; it is consulted to
    /// count the candidate's children for an `Inside` drop.
    pub fn drop<C>(&mut self, rendered: &[RenderedNode], client: &mut C) -> DropOutcome
    where
        C: MutationClient + ?Sized,
    {
        let (dragged, candidate, zone) = match &self.state {
            DragState::Hovering {
                dragged,
                candidate,
                zone,
            } if zone.is_valid() => (dragged, candidate, *zone),
            state if state.is_live() => {
                self.state = DragState::Cancelled;
                return DropOutcome::Cancelled;
            }
            _ => return DropOutcome::Ignored,
        };

        let intent = self.intent_for(dragged, candidate, zone, rendered);

        if is_same_slot(dragged, &intent) {
            tracing::debug!("Drop of {} leaves it in place", dragged.id);
            self.state = DragState::Applied { intent: None };
            return DropOutcome::Unchanged;
        }

        client.request_move(intent.clone());
        self.state = DragState::Applied {
            intent: Some(intent.clone()),
        };
        DropOutcome::Requested(intent)
    }

    /// Abort the gesture without side effects
    pub fn cancel(&mut self) {
        if self.state.is_live() {
            self.state = DragState::Cancelled;
        }
    }

    /// Drag finished; forget everything
    pub fn end(&mut self) {
        self.state = DragState::Idle;
    }

    fn intent_for(
        &self,
        dragged: &RenderedNode,
        candidate: &RenderedNode,
        zone: HoverZone,
        rendered: &[RenderedNode],
    ) -> MoveIntent {
        let (parent_id, position) = match zone {
            HoverZone::Inside => {
                let position = match self.config.insert_policy {
                    InsertPolicy::Append => rendered_child_count(rendered, &candidate.id),
                    InsertPolicy::Prepend => 0,
                };
                (Some(candidate.id.clone()), position)
            }
            HoverZone::After => (candidate.parent_id.clone(), candidate.position.saturating_add(1)),
            // Invalid is filtered out by the caller
            HoverZone::Before | HoverZone::Invalid => {
                (candidate.parent_id.clone(), candidate.position)
            }
        };

        MoveIntent {
            id: dragged.id.clone(),
            parent_id,
            position,
        }
    }
}

fn rendered_child_count(rendered: &[RenderedNode], parent_id: &str) -> u32 {
    let count = rendered
        .iter()
        .filter(|node| node.parent_id.as_deref() == Some(parent_id))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Both gaps adjacent to the dragged node's own slot put it back where it is
fn is_same_slot(dragged: &RenderedNode, intent: &MoveIntent) -> bool {
    dragged.parent_id == intent.parent_id
        && (intent.position == dragged.position
            || Some(intent.position) == dragged.position.checked_add(1))
}
