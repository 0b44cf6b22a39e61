//! Results handed back to the editor for re-rendering

use serde::{Deserialize, Serialize};

/// One sibling's id and its position after an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement<Id> {
    pub id: Id,
    pub position: i64,
}

/// Where an item sits: its parent and 1-based position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot<P> {
    pub parent: P,
    pub position: i64,
}

/// Direction of an adjacent swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Position delta of the neighbour to swap with
    pub fn offset(&self) -> i64 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }

    fn boundary(&self) -> NoOpReason {
        match self {
            Direction::Left => NoOpReason::AlreadyFirst,
            Direction::Right => NoOpReason::AlreadyLast,
        }
    }
}

/// Why a valid request changed nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoOpReason {
    AlreadyFirst,
    AlreadyLast,
}

impl NoOpReason {
    pub(crate) fn for_direction(direction: Direction) -> Self {
        direction.boundary()
    }

    /// Informational message for the editor
    pub fn message(&self) -> &'static str {
        match self {
            NoOpReason::AlreadyFirst => "already at first position",
            NoOpReason::AlreadyLast => "already at last position",
        }
    }
}

impl std::fmt::Display for NoOpReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of move left / move right
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MoveOutcome<Id> {
    /// Swapped; the full sibling list in its new order
    Moved { siblings: Vec<Placement<Id>> },
    /// Already at the boundary, nothing written
    NoOp { reason: NoOpReason },
}

impl<Id> MoveOutcome<Id> {
    pub fn is_noop(&self) -> bool {
        matches!(self, MoveOutcome::NoOp { .. })
    }
}

/// Details of a completed cross-parent move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReparentReport<Id, P> {
    pub id: Id,
    pub from: Slot<P>,
    pub to: Slot<P>,
    /// Old parent's siblings after the gap was closed
    pub source_siblings: Vec<Placement<Id>>,
    /// New parent's siblings including the moved item
    pub target_siblings: Vec<Placement<Id>>,
    /// Descendant rows whose cached ancestor ids were rewritten
    pub descendants_synced: usize,
}

/// Outcome of a reparent request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReparentOutcome<Id, P> {
    Moved(ReparentReport<Id, P>),
    /// Target parent is the current parent
    Unchanged { slot: Slot<P> },
}

impl<Id, P> ReparentOutcome<Id, P> {
    pub fn report(&self) -> Option<&ReparentReport<Id, P>> {
        match self {
            ReparentOutcome::Moved(report) => Some(report),
            ReparentOutcome::Unchanged { .. } => None,
        }
    }
}
