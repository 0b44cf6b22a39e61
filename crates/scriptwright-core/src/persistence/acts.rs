//! Act operations

use rusqlite::{params, Connection, OptionalExtension};

use super::repository::Repository;
use super::rows::{now_rfc3339, row_to_act, ACT_COLUMNS};
use crate::error::{Result, ScriptError};
use crate::hierarchy::{Act, NewAct, NodeKind};
use crate::ids::{ActId, EntityId, ProjectId};
use crate::ownership::ProjectScope;
use crate::positioning::{Direction, MoveOutcome, Placement, PositionedCollection, Slot};

impl Repository {
    // ==================== Act Operations ====================

    /// Append an act at the end of the project
    pub fn create_act(&mut self, scope: &ProjectScope, new: NewAct) -> Result<Act> {
        new.validate(&self.config().limits)?;
        let project = scope.project_id();
        let id = ActId::new();

        self.write("create_act", |conn, config| {
            scope.ensure_contains(conn, NodeKind::Project, project)?;
            let position =
                PositionedCollection::<Act>::new(conn, &config.positioning).append(project)?;
            let now = now_rfc3339();
            conn.execute(
                "INSERT INTO acts (id, project_id, title, description, position, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                params![
                    id.as_key(),
                    project.as_key(),
                    new.title.trim(),
                    new.description,
                    position,
                    now
                ],
            )?;
            tracing::info!(act = %id, %project, position, "created act");
            fetch_act(conn, id)
        })
    }

    /// Get an act of the scoped project
    pub fn get_act(&self, scope: &ProjectScope, id: ActId) -> Result<Act> {
        scope.ensure_contains(self.connection(), NodeKind::Act, id)?;
        fetch_act(self.connection(), id)
    }

    /// Acts of the scoped project in order
    pub fn acts(&self, scope: &ProjectScope) -> Result<Vec<Act>> {
        list_acts(self.connection(), scope.project_id())
    }

    /// Swap an act with its left or right neighbour
    pub fn move_act(
        &mut self,
        scope: &ProjectScope,
        id: ActId,
        direction: Direction,
    ) -> Result<MoveOutcome<ActId>> {
        let span = tracing::info_span!("move_act", act = %id, ?direction);
        let _enter = span.enter();

        self.write("move_act", |conn, config| {
            scope.ensure_contains(conn, NodeKind::Act, id)?;
            PositionedCollection::<Act>::new(conn, &config.positioning).move_adjacent(id, direction)
        })
    }

    pub fn move_act_left(&mut self, scope: &ProjectScope, id: ActId) -> Result<MoveOutcome<ActId>> {
        self.move_act(scope, id, Direction::Left)
    }

    pub fn move_act_right(&mut self, scope: &ProjectScope, id: ActId) -> Result<MoveOutcome<ActId>> {
        self.move_act(scope, id, Direction::Right)
    }

    /// Replace the act order of the scoped project.
    ///
    /// `ordered` must list every act of the project exactly once.
    pub fn reorder_acts(
        &mut self,
        scope: &ProjectScope,
        ordered: &[ActId],
    ) -> Result<Vec<Placement<ActId>>> {
        let project = scope.project_id();
        let span = tracing::info_span!("reorder_acts", %project, count = ordered.len());
        let _enter = span.enter();

        self.write("reorder_acts", |conn, config| {
            scope.ensure_contains(conn, NodeKind::Project, project)?;
            PositionedCollection::<Act>::new(conn, &config.positioning)
                .bulk_reorder(project, ordered)
        })
    }

    /// Delete an act with its sequences and scenes, closing the gap
    pub fn delete_act(&mut self, scope: &ProjectScope, id: ActId) -> Result<Slot<ProjectId>> {
        let span = tracing::info_span!("delete_act", act = %id);
        let _enter = span.enter();

        self.write("delete_act", |conn, config| {
            scope.ensure_contains(conn, NodeKind::Act, id)?;
            PositionedCollection::<Act>::new(conn, &config.positioning).remove(id)
        })
    }
}

pub(crate) fn list_acts(conn: &Connection, project: ProjectId) -> Result<Vec<Act>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {ACT_COLUMNS} FROM acts WHERE project_id = ?1 ORDER BY position"
    ))?;
    let acts = stmt
        .query_map([project.as_key()], row_to_act)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(acts)
}

fn fetch_act(conn: &Connection, id: ActId) -> Result<Act> {
    conn.query_row(
        &format!("SELECT {ACT_COLUMNS} FROM acts WHERE id = ?1"),
        [id.as_key()],
        row_to_act,
    )
    .optional()?
    .ok_or_else(|| ScriptError::not_found(NodeKind::Act, id))
}
