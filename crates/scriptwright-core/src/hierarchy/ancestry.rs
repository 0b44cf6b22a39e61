//! Cached ancestor ids
//!
//! `sequences.project_id`, `scenes.act_id` and `scenes.project_id` exist so
//! flat listings can filter by ancestor without joins. They are a
//! materialized view of the parent chain: every write that changes a parent
//! link rewrites them in the same transaction.

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::error::{Result, ScriptError};
use crate::ids::{ActId, EntityId, ProjectId, SequenceId};
use crate::persistence::rows::{now_rfc3339, parse_id};

use super::NodeKind;

/// A cached ancestor column to write alongside a parent change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorRef {
    pub column: &'static str,
    pub value: String,
}

impl AncestorRef {
    pub fn project(id: ProjectId) -> Self {
        Self {
            column: "project_id",
            value: id.as_key(),
        }
    }

    pub fn act(id: ActId) -> Self {
        Self {
            column: "act_id",
            value: id.as_key(),
        }
    }
}

/// A cached ancestor id that disagrees with the live parent chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleReference {
    pub kind: NodeKind,
    pub id: String,
    pub column: &'static str,
    pub cached: Option<String>,
    pub expected: Option<String>,
}

/// Project of `act`, the value a sequence under it must cache
pub(crate) fn project_of_act(conn: &Connection, act: ActId) -> Result<ProjectId> {
    let key: Option<String> = conn
        .query_row(
            "SELECT project_id FROM acts WHERE id = ?1",
            [act.as_key()],
            |row| row.get(0),
        )
        .optional()?;
    let key = key.ok_or_else(|| ScriptError::not_found(NodeKind::Act, act))?;
    Ok(parse_id(&key)?)
}

/// Act and project of `sequence`, the values a scene under it must cache
pub(crate) fn ancestors_of_sequence(
    conn: &Connection,
    sequence: SequenceId,
) -> Result<(ActId, ProjectId)> {
    let keys: Option<(String, String)> = conn
        .query_row(
            "SELECT act_id, project_id FROM sequences WHERE id = ?1",
            [sequence.as_key()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    let (act, project) = keys.ok_or_else(|| ScriptError::not_found(NodeKind::Sequence, sequence))?;
    Ok((parse_id(&act)?, parse_id(&project)?))
}

/// Rewrite the cached act/project ids of every scene in `sequence`.
///
/// Cascade step of a sequence move; returns the number of scenes touched.
pub(crate) fn sync_scenes_of_sequence(
    conn: &Connection,
    sequence: SequenceId,
    act: ActId,
    project: ProjectId,
) -> Result<usize> {
    let synced = conn.execute(
        "UPDATE scenes SET act_id = ?1, project_id = ?2, updated_at = ?3 WHERE sequence_id = ?4",
        params![act.as_key(), project.as_key(), now_rfc3339(), sequence.as_key()],
    )?;
    tracing::debug!(%sequence, %act, %project, scenes = synced, "synced cached ancestors");
    Ok(synced)
}

/// Recompute every cached ancestor column from the parent chain.
///
/// Sequences first, so scenes read fresh `sequences.project_id` values.
pub fn resync_all(conn: &Connection) -> Result<usize> {
    let sequences = conn.execute(
        "UPDATE sequences
         SET project_id = (SELECT a.project_id FROM acts a WHERE a.id = sequences.act_id)
         WHERE project_id IS NOT (SELECT a.project_id FROM acts a WHERE a.id = sequences.act_id)",
        [],
    )?;
    let scenes = conn.execute(
        "UPDATE scenes
         SET act_id = (SELECT s.act_id FROM sequences s WHERE s.id = scenes.sequence_id),
             project_id = (SELECT s.project_id FROM sequences s WHERE s.id = scenes.sequence_id)
         WHERE act_id IS NOT (SELECT s.act_id FROM sequences s WHERE s.id = scenes.sequence_id)
            OR project_id IS NOT (SELECT s.project_id FROM sequences s WHERE s.id = scenes.sequence_id)",
        [],
    )?;
    Ok(sequences + scenes)
}

/// Every cached ancestor id that disagrees with the parent chain
pub fn stale_references(conn: &Connection) -> Result<Vec<StaleReference>> {
    let mut stale = Vec::new();

    let mut stmt = conn.prepare(
        "SELECT s.id, s.project_id, a.project_id
         FROM sequences s LEFT JOIN acts a ON a.id = s.act_id
         WHERE s.project_id IS NOT a.project_id
         ORDER BY s.id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(StaleReference {
            kind: NodeKind::Sequence,
            id: row.get(0)?,
            column: "project_id",
            cached: row.get(1)?,
            expected: row.get(2)?,
        })
    })?;
    for row in rows {
        stale.push(row?);
    }

    let mut stmt = conn.prepare(
        "SELECT sc.id, sc.act_id, sq.act_id, sc.project_id, sq.project_id
         FROM scenes sc LEFT JOIN sequences sq ON sq.id = sc.sequence_id
         WHERE sc.act_id IS NOT sq.act_id OR sc.project_id IS NOT sq.project_id
         ORDER BY sc.id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, Option<String>>(4)?,
        ))
    })?;
    for row in rows {
        let (id, cached_act, live_act, cached_project, live_project) = row?;
        if cached_act != live_act {
            stale.push(StaleReference {
                kind: NodeKind::Scene,
                id: id.clone(),
                column: "act_id",
                cached: cached_act,
                expected: live_act,
            });
        }
        if cached_project != live_project {
            stale.push(StaleReference {
                kind: NodeKind::Scene,
                id,
                column: "project_id",
                cached: cached_project,
                expected: live_project,
            });
        }
    }

    Ok(stale)
}
