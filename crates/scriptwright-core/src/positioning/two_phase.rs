//! Two-phase position writes
//!
//! SQLite checks UNIQUE(parent, position) row by row, so rewriting several
//! positions in place can collide with a row that has not been rewritten yet.
//! Every multi-row change first parks the affected rows on distinct negative
//! values, then writes the final values. Live rows never hold negative
//! positions, so the parked values cannot collide with anything.
//!
//! Both helpers must run inside the caller's transaction.

use rusqlite::{params, Connection};

use crate::error::{Result, ScriptError};
use crate::hierarchy::NodeKind;

/// Write explicit final positions for a set of rows.
///
/// `assignments` pairs a row key with its final position. Every final
/// position must be free once the listed rows are parked, which holds when
/// the rows are a whole sibling set (reorder, repair) or swap each other's
/// positions.
pub(crate) fn apply_assignments(
    conn: &Connection,
    kind: NodeKind,
    temp_base: i64,
    assignments: &[(String, i64)],
) -> Result<()> {
    let table = kind.table();
    let mut stage = conn.prepare_cached(&format!(
        "UPDATE {table} SET position = ?1 WHERE id = ?2"
    ))?;

    for (index, (key, _)) in assignments.iter().enumerate() {
        let parked = -(temp_base + index as i64);
        tracing::debug!(%kind, id = %key, parked, "parking position");
        if stage.execute(params![parked, key])? != 1 {
            return Err(ScriptError::not_found(kind, key));
        }
    }

    for (key, position) in assignments {
        stage.execute(params![position, key])?;
    }

    Ok(())
}

/// Shift every sibling at or after `from` by `delta` (+1 to make room, -1
/// to close a gap). Returns the number of rows moved.
///
/// Set-based: rows are parked at `-(temp_base + position + delta)` and then
/// flipped back, so the final values never meet a live row.
pub(crate) fn shift_from(
    conn: &Connection,
    kind: NodeKind,
    temp_base: i64,
    parent_key: &str,
    from: i64,
    delta: i64,
) -> Result<usize> {
    let table = kind.table();
    let parent_column = kind.parent_column();

    let parked = conn.execute(
        &format!(
            "UPDATE {table} SET position = -(?1 + position + ?2)
             WHERE {parent_column} = ?3 AND position >= ?4"
        ),
        params![temp_base, delta, parent_key, from],
    )?;
    if parked == 0 {
        return Ok(0);
    }

    conn.execute(
        &format!(
            "UPDATE {table} SET position = -position - ?1
             WHERE {parent_column} = ?2 AND position < 0"
        ),
        params![temp_base, parent_key],
    )?;

    tracing::debug!(%kind, parent = %parent_key, from, delta, rows = parked, "shifted siblings");
    Ok(parked)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acts_table() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE acts (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                UNIQUE (project_id, position)
            );
            INSERT INTO acts VALUES ('a', 'p', 1), ('b', 'p', 2), ('c', 'p', 3), ('x', 'q', 1);",
        )
        .unwrap();
        conn
    }

    fn positions(conn: &Connection, parent: &str) -> Vec<(String, i64)> {
        let mut stmt = conn
            .prepare("SELECT id, position FROM acts WHERE project_id = ?1 ORDER BY position")
            .unwrap();
        stmt.query_map([parent], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_swap_through_parking() {
        let conn = acts_table();
        apply_assignments(
            &conn,
            NodeKind::Act,
            1000,
            &[("a".into(), 2), ("b".into(), 1)],
        )
        .unwrap();
        assert_eq!(
            positions(&conn, "p"),
            vec![("b".into(), 1), ("a".into(), 2), ("c".into(), 3)]
        );
    }

    #[test]
    fn test_full_permutation() {
        let conn = acts_table();
        apply_assignments(
            &conn,
            NodeKind::Act,
            1000,
            &[("c".into(), 1), ("a".into(), 2), ("b".into(), 3)],
        )
        .unwrap();
        assert_eq!(
            positions(&conn, "p"),
            vec![("c".into(), 1), ("a".into(), 2), ("b".into(), 3)]
        );
    }

    #[test]
    fn test_unknown_key_is_not_found() {
        let conn = acts_table();
        let err = apply_assignments(&conn, NodeKind::Act, 1000, &[("zzz".into(), 1)]).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_shift_up_makes_room() {
        let conn = acts_table();
        let moved = shift_from(&conn, NodeKind::Act, 1000, "p", 2, 1).unwrap();
        assert_eq!(moved, 2);
        assert_eq!(
            positions(&conn, "p"),
            vec![("a".into(), 1), ("b".into(), 3), ("c".into(), 4)]
        );
        // other parents untouched
        assert_eq!(positions(&conn, "q"), vec![("x".into(), 1)]);
    }

    #[test]
    fn test_shift_down_closes_gap() {
        let conn = acts_table();
        conn.execute("DELETE FROM acts WHERE id = 'a'", []).unwrap();
        let moved = shift_from(&conn, NodeKind::Act, 1000, "p", 2, -1).unwrap();
        assert_eq!(moved, 2);
        assert_eq!(
            positions(&conn, "p"),
            vec![("b".into(), 1), ("c".into(), 2)]
        );
    }

    #[test]
    fn test_shift_with_nothing_after() {
        let conn = acts_table();
        assert_eq!(shift_from(&conn, NodeKind::Act, 1000, "p", 4, 1).unwrap(), 0);
    }
}
