//! The project → act → sequence → scene hierarchy
//!
//! ```text
//! Project → Act → Sequence → Scene
//!   root    L1       L2        L3
//! ```
//!
//! Each level below the project is a sibling-ordered collection scoped by its
//! parent. Sequences cache their project id, scenes cache their act and
//! project ids; [`ancestry`] keeps those caches in step with the parent chain.

pub mod act;
pub mod ancestry;
pub mod project;
pub mod scene;
pub mod sequence;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ids::EntityId;

pub use act::{Act, NewAct};
pub use ancestry::{AncestorRef, StaleReference};
pub use project::{NewProject, Project};
pub use scene::{NewScene, Scene, DEFAULT_SCENE_COLOR};
pub use sequence::{NewSequence, Sequence};

/// Kind of hierarchy node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Project,
    Act,
    Sequence,
    Scene,
}

impl NodeKind {
    /// Backing table
    pub fn table(&self) -> &'static str {
        match self {
            NodeKind::Project => "projects",
            NodeKind::Act => "acts",
            NodeKind::Sequence => "sequences",
            NodeKind::Scene => "scenes",
        }
    }

    /// Column holding the scoping parent's id (the project has none)
    pub fn parent_column(&self) -> &'static str {
        match self {
            NodeKind::Project => "owner_id",
            NodeKind::Act => "project_id",
            NodeKind::Sequence => "act_id",
            NodeKind::Scene => "sequence_id",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Project => "project",
            NodeKind::Act => "act",
            NodeKind::Sequence => "sequence",
            NodeKind::Scene => "scene",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A sibling-ordered level of the hierarchy.
///
/// Binds the generic positioning engine to a table and its parent column.
pub trait Positioned {
    type Id: EntityId;
    type ParentId: EntityId;

    const KIND: NodeKind;
    const PARENT_KIND: NodeKind;
}

/// Shared title check for all levels
pub(crate) fn validate_title(kind: NodeKind, title: &str, max: usize) -> Result<(), ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankTitle(kind));
    }
    let len = trimmed.chars().count();
    if len > max {
        return Err(ValidationError::TitleTooLong { kind, len, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_point_at_their_parents() {
        assert_eq!(<Act as Positioned>::PARENT_KIND, NodeKind::Project);
        assert_eq!(<Sequence as Positioned>::PARENT_KIND, NodeKind::Act);
        assert_eq!(<Scene as Positioned>::PARENT_KIND, NodeKind::Sequence);
        assert_eq!(NodeKind::Scene.parent_column(), "sequence_id");
    }

    #[test]
    fn test_title_validation() {
        assert!(validate_title(NodeKind::Act, "Setup", 100).is_ok());
        assert_eq!(
            validate_title(NodeKind::Act, "   ", 100),
            Err(ValidationError::BlankTitle(NodeKind::Act))
        );
        assert!(matches!(
            validate_title(NodeKind::Scene, &"x".repeat(201), 200),
            Err(ValidationError::TitleTooLong { len: 201, max: 200, .. })
        ));
    }
}
