//! Scene operations

use rusqlite::{params, Connection, OptionalExtension};

use super::repository::Repository;
use super::rows::{now_rfc3339, row_to_scene, SCENE_COLUMNS};
use crate::error::{Result, ScriptError};
use crate::hierarchy::ancestry::ancestors_of_sequence;
use crate::hierarchy::{AncestorRef, NewScene, NodeKind, Scene};
use crate::ids::{EntityId, ProjectId, SceneId, SequenceId};
use crate::ownership::ProjectScope;
use crate::positioning::{
    Direction, MoveOutcome, Placement, PositionedCollection, ReparentOutcome, Slot,
};

impl Repository {
    // ==================== Scene Operations ====================

    /// Append a scene at the end of `sequence`
    pub fn create_scene(
        &mut self,
        scope: &ProjectScope,
        sequence: SequenceId,
        new: NewScene,
    ) -> Result<Scene> {
        new.validate(&self.config().limits)?;
        let id = SceneId::new();

        self.write("create_scene", |conn, config| {
            scope.ensure_contains(conn, NodeKind::Sequence, sequence)?;
            let (act, project) = ancestors_of_sequence(conn, sequence)?;
            let position =
                PositionedCollection::<Scene>::new(conn, &config.positioning).append(sequence)?;
            let now = now_rfc3339();
            conn.execute(
                "INSERT INTO scenes (id, sequence_id, act_id, project_id, title, description, color, time_of_day, position, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
                params![
                    id.as_key(),
                    sequence.as_key(),
                    act.as_key(),
                    project.as_key(),
                    new.title.trim(),
                    new.description,
                    new.color_or_default().to_ascii_uppercase(),
                    new.time_of_day,
                    position,
                    now
                ],
            )?;
            tracing::info!(scene = %id, %sequence, position, "created scene");
            fetch_scene(conn, id)
        })
    }

    /// Get a scene of the scoped project
    pub fn get_scene(&self, scope: &ProjectScope, id: SceneId) -> Result<Scene> {
        scope.ensure_contains(self.connection(), NodeKind::Scene, id)?;
        fetch_scene(self.connection(), id)
    }

    /// Scenes of `sequence` in order
    pub fn scenes_in_sequence(
        &self,
        scope: &ProjectScope,
        sequence: SequenceId,
    ) -> Result<Vec<Scene>> {
        let conn = self.connection();
        scope.ensure_contains(conn, NodeKind::Sequence, sequence)?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {SCENE_COLUMNS} FROM scenes WHERE sequence_id = ?1 ORDER BY position"
        ))?;
        let scenes = stmt
            .query_map([sequence.as_key()], row_to_scene)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(scenes)
    }

    /// Every scene of the scoped project in screenplay order
    pub fn scenes_in_project(&self, scope: &ProjectScope) -> Result<Vec<Scene>> {
        list_project_scenes(self.connection(), scope.project_id())
    }

    /// Swap a scene with its left or right neighbour within its sequence
    pub fn move_scene(
        &mut self,
        scope: &ProjectScope,
        id: SceneId,
        direction: Direction,
    ) -> Result<MoveOutcome<SceneId>> {
        let span = tracing::info_span!("move_scene", scene = %id, ?direction);
        let _enter = span.enter();

        self.write("move_scene", |conn, config| {
            scope.ensure_contains(conn, NodeKind::Scene, id)?;
            PositionedCollection::<Scene>::new(conn, &config.positioning)
                .move_adjacent(id, direction)
        })
    }

    pub fn move_scene_left(
        &mut self,
        scope: &ProjectScope,
        id: SceneId,
    ) -> Result<MoveOutcome<SceneId>> {
        self.move_scene(scope, id, Direction::Left)
    }

    pub fn move_scene_right(
        &mut self,
        scope: &ProjectScope,
        id: SceneId,
    ) -> Result<MoveOutcome<SceneId>> {
        self.move_scene(scope, id, Direction::Right)
    }

    /// Replace the scene order within `sequence`
    pub fn reorder_scenes(
        &mut self,
        scope: &ProjectScope,
        sequence: SequenceId,
        ordered: &[SceneId],
    ) -> Result<Vec<Placement<SceneId>>> {
        let span = tracing::info_span!("reorder_scenes", %sequence, count = ordered.len());
        let _enter = span.enter();

        self.write("reorder_scenes", |conn, config| {
            scope.ensure_contains(conn, NodeKind::Sequence, sequence)?;
            PositionedCollection::<Scene>::new(conn, &config.positioning)
                .bulk_reorder(sequence, ordered)
        })
    }

    /// Move a scene to another sequence of the same project, at `position`
    /// (1-based) or at the end. Its cached act and project ids follow the
    /// new sequence.
    pub fn move_scene_to_sequence(
        &mut self,
        scope: &ProjectScope,
        id: SceneId,
        target_sequence: SequenceId,
        position: Option<i64>,
    ) -> Result<ReparentOutcome<SceneId, SequenceId>> {
        let span = tracing::info_span!(
            "move_scene_to_sequence",
            scene = %id,
            %target_sequence,
            ?position
        );
        let _enter = span.enter();

        self.write("move_scene_to_sequence", |conn, config| {
            scope.ensure_contains(conn, NodeKind::Scene, id)?;
            scope.ensure_contains(conn, NodeKind::Sequence, target_sequence)?;
            let (act, project) = ancestors_of_sequence(conn, target_sequence)?;

            PositionedCollection::<Scene>::new(conn, &config.positioning).reparent(
                id,
                target_sequence,
                position,
                &[AncestorRef::act(act), AncestorRef::project(project)],
            )
        })
    }

    /// Delete a scene, closing the gap in its sequence
    pub fn delete_scene(&mut self, scope: &ProjectScope, id: SceneId) -> Result<Slot<SequenceId>> {
        let span = tracing::info_span!("delete_scene", scene = %id);
        let _enter = span.enter();

        self.write("delete_scene", |conn, config| {
            scope.ensure_contains(conn, NodeKind::Scene, id)?;
            PositionedCollection::<Scene>::new(conn, &config.positioning).remove(id)
        })
    }
}

pub(crate) fn list_project_scenes(conn: &Connection, project: ProjectId) -> Result<Vec<Scene>> {
    let columns = SCENE_COLUMNS
        .split(", ")
        .map(|c| format!("sc.{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {columns} FROM scenes sc
         JOIN sequences sq ON sq.id = sc.sequence_id
         JOIN acts a ON a.id = sq.act_id
         WHERE sc.project_id = ?1
         ORDER BY a.position, sq.position, sc.position"
    ))?;
    let scenes = stmt
        .query_map([project.as_key()], row_to_scene)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(scenes)
}

fn fetch_scene(conn: &Connection, id: SceneId) -> Result<Scene> {
    conn.query_row(
        &format!("SELECT {SCENE_COLUMNS} FROM scenes WHERE id = ?1"),
        [id.as_key()],
        row_to_scene,
    )
    .optional()?
    .ok_or_else(|| ScriptError::not_found(NodeKind::Scene, id))
}
