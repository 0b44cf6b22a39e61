//! Sequence operations

use rusqlite::{params, Connection, OptionalExtension};

use super::repository::Repository;
use super::rows::{now_rfc3339, row_to_sequence, SEQUENCE_COLUMNS};
use crate::error::{Result, ScriptError};
use crate::hierarchy::ancestry::{project_of_act, sync_scenes_of_sequence};
use crate::hierarchy::{AncestorRef, NewSequence, NodeKind, Sequence};
use crate::ids::{ActId, EntityId, ProjectId, SequenceId};
use crate::ownership::ProjectScope;
use crate::positioning::{
    Direction, MoveOutcome, Placement, PositionedCollection, ReparentOutcome, Slot,
};

impl Repository {
    // ==================== Sequence Operations ====================

    /// Append a sequence at the end of `act`
    pub fn create_sequence(
        &mut self,
        scope: &ProjectScope,
        act: ActId,
        new: NewSequence,
    ) -> Result<Sequence> {
        new.validate(&self.config().limits)?;
        let id = SequenceId::new();

        self.write("create_sequence", |conn, config| {
            scope.ensure_contains(conn, NodeKind::Act, act)?;
            let project = project_of_act(conn, act)?;
            let position =
                PositionedCollection::<Sequence>::new(conn, &config.positioning).append(act)?;
            let now = now_rfc3339();
            conn.execute(
                "INSERT INTO sequences (id, act_id, project_id, title, description, position, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                params![
                    id.as_key(),
                    act.as_key(),
                    project.as_key(),
                    new.title.trim(),
                    new.description,
                    position,
                    now
                ],
            )?;
            tracing::info!(sequence = %id, %act, position, "created sequence");
            fetch_sequence(conn, id)
        })
    }

    /// Get a sequence of the scoped project
    pub fn get_sequence(&self, scope: &ProjectScope, id: SequenceId) -> Result<Sequence> {
        scope.ensure_contains(self.connection(), NodeKind::Sequence, id)?;
        fetch_sequence(self.connection(), id)
    }

    /// Sequences of `act` in order
    pub fn sequences_in_act(&self, scope: &ProjectScope, act: ActId) -> Result<Vec<Sequence>> {
        let conn = self.connection();
        scope.ensure_contains(conn, NodeKind::Act, act)?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {SEQUENCE_COLUMNS} FROM sequences WHERE act_id = ?1 ORDER BY position"
        ))?;
        let sequences = stmt
            .query_map([act.as_key()], row_to_sequence)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(sequences)
    }

    /// Every sequence of the scoped project, in act order then position
    pub fn sequences_in_project(&self, scope: &ProjectScope) -> Result<Vec<Sequence>> {
        list_project_sequences(self.connection(), scope.project_id())
    }

    /// Swap a sequence with its left or right neighbour within its act
    pub fn move_sequence(
        &mut self,
        scope: &ProjectScope,
        id: SequenceId,
        direction: Direction,
    ) -> Result<MoveOutcome<SequenceId>> {
        let span = tracing::info_span!("move_sequence", sequence = %id, ?direction);
        let _enter = span.enter();

        self.write("move_sequence", |conn, config| {
            scope.ensure_contains(conn, NodeKind::Sequence, id)?;
            PositionedCollection::<Sequence>::new(conn, &config.positioning)
                .move_adjacent(id, direction)
        })
    }

    pub fn move_sequence_left(
        &mut self,
        scope: &ProjectScope,
        id: SequenceId,
    ) -> Result<MoveOutcome<SequenceId>> {
        self.move_sequence(scope, id, Direction::Left)
    }

    pub fn move_sequence_right(
        &mut self,
        scope: &ProjectScope,
        id: SequenceId,
    ) -> Result<MoveOutcome<SequenceId>> {
        self.move_sequence(scope, id, Direction::Right)
    }

    /// Replace the sequence order within `act`
    pub fn reorder_sequences(
        &mut self,
        scope: &ProjectScope,
        act: ActId,
        ordered: &[SequenceId],
    ) -> Result<Vec<Placement<SequenceId>>> {
        let span = tracing::info_span!("reorder_sequences", %act, count = ordered.len());
        let _enter = span.enter();

        self.write("reorder_sequences", |conn, config| {
            scope.ensure_contains(conn, NodeKind::Act, act)?;
            PositionedCollection::<Sequence>::new(conn, &config.positioning)
                .bulk_reorder(act, ordered)
        })
    }

    /// Move a sequence to another act of the same project.
    ///
    /// Lands at `position` (1-based) or at the end. The sequence's cached
    /// project id and the cached act and project ids of all its scenes are
    /// rewritten in the same transaction.
    pub fn move_sequence_to_act(
        &mut self,
        scope: &ProjectScope,
        id: SequenceId,
        target_act: ActId,
        position: Option<i64>,
    ) -> Result<ReparentOutcome<SequenceId, ActId>> {
        let span = tracing::info_span!(
            "move_sequence_to_act",
            sequence = %id,
            %target_act,
            ?position
        );
        let _enter = span.enter();

        self.write("move_sequence_to_act", |conn, config| {
            scope.ensure_contains(conn, NodeKind::Sequence, id)?;
            scope.ensure_contains(conn, NodeKind::Act, target_act)?;
            let project = project_of_act(conn, target_act)?;

            let mut outcome = PositionedCollection::<Sequence>::new(conn, &config.positioning)
                .reparent(id, target_act, position, &[AncestorRef::project(project)])?;

            if let ReparentOutcome::Moved(report) = &mut outcome {
                report.descendants_synced = sync_scenes_of_sequence(conn, id, target_act, project)?;
            }
            Ok(outcome)
        })
    }

    /// Delete a sequence with its scenes, closing the gap in its act
    pub fn delete_sequence(
        &mut self,
        scope: &ProjectScope,
        id: SequenceId,
    ) -> Result<Slot<ActId>> {
        let span = tracing::info_span!("delete_sequence", sequence = %id);
        let _enter = span.enter();

        self.write("delete_sequence", |conn, config| {
            scope.ensure_contains(conn, NodeKind::Sequence, id)?;
            PositionedCollection::<Sequence>::new(conn, &config.positioning).remove(id)
        })
    }
}

pub(crate) fn list_project_sequences(
    conn: &Connection,
    project: ProjectId,
) -> Result<Vec<Sequence>> {
    let columns = SEQUENCE_COLUMNS
        .split(", ")
        .map(|c| format!("s.{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {columns} FROM sequences s
         JOIN acts a ON a.id = s.act_id
         WHERE s.project_id = ?1
         ORDER BY a.position, s.position"
    ))?;
    let sequences = stmt
        .query_map([project.as_key()], row_to_sequence)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(sequences)
}

fn fetch_sequence(conn: &Connection, id: SequenceId) -> Result<Sequence> {
    conn.query_row(
        &format!("SELECT {SEQUENCE_COLUMNS} FROM sequences WHERE id = ?1"),
        [id.as_key()],
        row_to_sequence,
    )
    .optional()?
    .ok_or_else(|| ScriptError::not_found(NodeKind::Sequence, id))
}
