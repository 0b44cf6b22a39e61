//! Sibling ordering engine
//!
//! Maintains dense, 1-based, unique positions within a parent scope:
//! append, adjacent swap, full reorder, removal with gap close, and moves to
//! a different parent. All multi-row writes go through [`two_phase`] so the
//! UNIQUE(parent, position) index never sees a transient duplicate.

mod collection;
mod outcome;
mod two_phase;

pub use collection::{PositionDefect, PositionedCollection};
pub use outcome::{
    Direction, MoveOutcome, NoOpReason, Placement, ReparentOutcome, ReparentReport, Slot,
};
