//! Row mapping helpers

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::Row;

use crate::hierarchy::{Act, Project, Scene, Sequence};
use crate::ids::{EntityId, OwnerId};

pub(crate) const PROJECT_COLUMNS: &str = "id, owner_id, title, created_at, updated_at";
pub(crate) const ACT_COLUMNS: &str =
    "id, project_id, title, description, position, created_at, updated_at";
pub(crate) const SEQUENCE_COLUMNS: &str =
    "id, act_id, project_id, title, description, position, created_at, updated_at";
pub(crate) const SCENE_COLUMNS: &str = "id, sequence_id, act_id, project_id, title, description, color, time_of_day, position, created_at, updated_at";

/// Current time in the fixed-width form stored in every timestamp column,
/// so lexical order matches chronological order
pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_id<I: EntityId>(key: &str) -> rusqlite::Result<I> {
    uuid::Uuid::parse_str(key)
        .map(I::from_uuid)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

fn id_at<I: EntityId>(row: &Row, idx: usize) -> rusqlite::Result<I> {
    let key: String = row.get(idx)?;
    uuid::Uuid::parse_str(&key)
        .map(I::from_uuid)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn timestamp_at(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn row_to_project(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: id_at(row, 0)?,
        owner_id: OwnerId(row.get(1)?),
        title: row.get(2)?,
        created_at: timestamp_at(row, 3)?,
        updated_at: timestamp_at(row, 4)?,
    })
}

pub(crate) fn row_to_act(row: &Row) -> rusqlite::Result<Act> {
    Ok(Act {
        id: id_at(row, 0)?,
        project_id: id_at(row, 1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        position: row.get(4)?,
        created_at: timestamp_at(row, 5)?,
        updated_at: timestamp_at(row, 6)?,
    })
}

pub(crate) fn row_to_sequence(row: &Row) -> rusqlite::Result<Sequence> {
    Ok(Sequence {
        id: id_at(row, 0)?,
        act_id: id_at(row, 1)?,
        project_id: id_at(row, 2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        position: row.get(5)?,
        created_at: timestamp_at(row, 6)?,
        updated_at: timestamp_at(row, 7)?,
    })
}

pub(crate) fn row_to_scene(row: &Row) -> rusqlite::Result<Scene> {
    Ok(Scene {
        id: id_at(row, 0)?,
        sequence_id: id_at(row, 1)?,
        act_id: id_at(row, 2)?,
        project_id: id_at(row, 3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        color: row.get(6)?,
        time_of_day: row.get(7)?,
        position: row.get(8)?,
        created_at: timestamp_at(row, 9)?,
        updated_at: timestamp_at(row, 10)?,
    })
}
