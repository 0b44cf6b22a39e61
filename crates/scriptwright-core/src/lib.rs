//! Scriptwright Core - ordered story structure for screenwriting projects
//!
//! This crate keeps the act, sequence and scene outline of a screenplay in
//! order while writers rearrange it:
//!
//! - **Hierarchy**: Project, Act, Sequence and Scene records with their create inputs
//! - **Positioning**: Dense 1-based sibling positions; append, swap, reorder, remove and reparent
//! - **Ancestry**: Cached ancestor ids kept in step with the parent chain on every move
//! - **Ownership**: Project scopes that confine every operation to one owner's project
//! - **Persistence**: SQLite storage with one immediate transaction per operation
//! - **Structure**: Nested read model and counts for re-rendering the editor
//! - **Config**: Database, staging and field limit settings
//!
//! # Three-Level Hierarchy
//!
//! ```text
//! Project → Act → Sequence → Scene
//!   root     L1      L2        L3
//! ```
//!
//! # Example
//!
//! ```
//! use scriptwright_core::{NewAct, NewProject, OwnerId, OwnershipGate, Repository};
//!
//! let mut repo = Repository::in_memory()?;
//! let owner = OwnerId::new("writer-1");
//! let project = repo.create_project(NewProject::new(owner.clone(), "Nightfall"))?;
//! let scope = repo.authorize(&owner, project.id)?;
//!
//! let one = repo.create_act(&scope, NewAct::new("Setup"))?;
//! let two = repo.create_act(&scope, NewAct::new("Confrontation"))?;
//! repo.reorder_acts(&scope, &[two.id, one.id])?;
//!
//! assert_eq!(repo.acts(&scope)?[0].title, "Confrontation");
//! # Ok::<(), scriptwright_core::ScriptError>(())
//! ```

pub mod config;
pub mod error;
pub mod hierarchy;
pub mod ids;
pub mod ownership;
pub mod persistence;
pub mod positioning;
pub mod structure;

pub use config::{DatabaseConfig, JournalMode, LimitsConfig, PositioningConfig, ScriptwrightConfig};
pub use error::{ConfigError, PersistenceError, Result, ScriptError, ValidationError};
pub use hierarchy::{
    Act, AncestorRef, NewAct, NewProject, NewScene, NewSequence, NodeKind, Positioned, Project,
    Scene, Sequence, StaleReference, DEFAULT_SCENE_COLOR,
};
pub use ids::{ActId, EntityId, OwnerId, ProjectId, SceneId, SequenceId};
pub use ownership::{OwnershipGate, ProjectScope};
pub use persistence::{IntegrityReport, RepairSummary, Repository, Schema, SCHEMA_VERSION};
pub use positioning::{
    Direction, MoveOutcome, NoOpReason, Placement, PositionDefect, PositionedCollection,
    ReparentOutcome, ReparentReport, Slot,
};
pub use structure::{ActNode, ProjectStructure, SequenceNode, StructureStats};

/// Returns the version of scriptwright-core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
