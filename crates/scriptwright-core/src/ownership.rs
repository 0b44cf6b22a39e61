//! Project ownership checks
//!
//! Every hierarchy operation runs against a [`ProjectScope`], which can only
//! be obtained from an [`OwnershipGate`]. Items outside the scope's project
//! are reported as not found, so a caller cannot probe another owner's ids.

use rusqlite::{Connection, OptionalExtension};

use crate::error::{Result, ScriptError};
use crate::hierarchy::NodeKind;
use crate::ids::{EntityId, OwnerId, ProjectId};

/// Proof that `owner` owns `project`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectScope {
    project_id: ProjectId,
    owner_id: OwnerId,
}

impl ProjectScope {
    pub(crate) fn new(project_id: ProjectId, owner_id: OwnerId) -> Self {
        Self {
            project_id,
            owner_id,
        }
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    /// Fail with `NotFound` unless `id` exists and belongs to this project.
    ///
    /// Every level below the project stores its project id, so this is a
    /// single lookup regardless of depth.
    pub(crate) fn ensure_contains<I: EntityId>(
        &self,
        conn: &Connection,
        kind: NodeKind,
        id: I,
    ) -> Result<()> {
        let column = match kind {
            NodeKind::Project => "id",
            _ => "project_id",
        };
        let project: Option<Option<String>> = conn
            .query_row(
                &format!("SELECT {column} FROM {} WHERE id = ?1", kind.table()),
                [id.as_key()],
                |row| row.get(0),
            )
            .optional()?;

        match project.flatten() {
            Some(key) if key == self.project_id.as_key() => Ok(()),
            _ => {
                tracing::debug!(%kind, %id, project = %self.project_id, "outside scope");
                Err(ScriptError::not_found(kind, id))
            }
        }
    }
}

/// Authorizes an owner against a project
pub trait OwnershipGate {
    /// Scope for `project` if `owner` owns it; `NotFound` otherwise
    fn authorize(&self, owner: &OwnerId, project: ProjectId) -> Result<ProjectScope>;
}
