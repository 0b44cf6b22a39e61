//! Dense 1-based ordering of one hierarchy level
//!
//! A `PositionedCollection` borrows an open transaction and operates on the
//! sibling sets of one level (acts, sequences or scenes). It never commits:
//! the repository wraps each public operation in a single transaction so a
//! failure at any step leaves every sibling set as it was.

use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::Serialize;

use crate::config::PositioningConfig;
use crate::error::{Result, ScriptError, ValidationError};
use crate::hierarchy::{AncestorRef, NodeKind, Positioned};
use crate::ids::EntityId;
use crate::persistence::rows::{now_rfc3339, parse_id};

use super::outcome::{
    Direction, MoveOutcome, NoOpReason, Placement, ReparentOutcome, ReparentReport, Slot,
};
use super::two_phase::{apply_assignments, shift_from};

/// A sibling set whose positions are not exactly `1..=n`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionDefect {
    pub kind: NodeKind,
    pub parent: String,
    /// Positions as stored, in ascending order
    pub positions: Vec<i64>,
}

/// Positioning engine for one level, bound to an open transaction
pub struct PositionedCollection<'c, T: Positioned> {
    conn: &'c Connection,
    temp_base: i64,
    _level: PhantomData<T>,
}

impl<'c, T: Positioned> PositionedCollection<'c, T> {
    pub fn new(conn: &'c Connection, positioning: &PositioningConfig) -> Self {
        Self {
            conn,
            temp_base: positioning.temp_position_base,
            _level: PhantomData,
        }
    }

    fn table() -> &'static str {
        T::KIND.table()
    }

    fn parent_column() -> &'static str {
        T::KIND.parent_column()
    }

    /// Current parent and position of `id`
    pub fn locate(&self, id: T::Id) -> Result<Slot<T::ParentId>> {
        let row: Option<(String, i64)> = self
            .conn
            .query_row(
                &format!(
                    "SELECT {}, position FROM {} WHERE id = ?1",
                    Self::parent_column(),
                    Self::table()
                ),
                [id.as_key()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let (parent, position) = row.ok_or_else(|| ScriptError::not_found(T::KIND, id))?;
        Ok(Slot {
            parent: parse_id(&parent)?,
            position,
        })
    }

    /// Siblings under `parent` ordered by position
    pub fn siblings(&self, parent: T::ParentId) -> Result<Vec<Placement<T::Id>>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT id, position FROM {} WHERE {} = ?1 ORDER BY position, created_at, id",
            Self::table(),
            Self::parent_column()
        ))?;
        let rows = stmt.query_map([parent.as_key()], |row| {
            let key: String = row.get(0)?;
            Ok(Placement {
                id: parse_id(&key)?,
                position: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn count(&self, parent: T::ParentId) -> Result<i64> {
        Ok(self.conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE {} = ?1",
                Self::table(),
                Self::parent_column()
            ),
            [parent.as_key()],
            |row| row.get(0),
        )?)
    }

    /// Position a new child of `parent` takes: max + 1, or 1 when empty.
    ///
    /// Read inside the same transaction as the insert that uses it.
    pub fn append(&self, parent: T::ParentId) -> Result<i64> {
        let max: i64 = self.conn.query_row(
            &format!(
                "SELECT COALESCE(MAX(position), 0) FROM {} WHERE {} = ?1",
                Self::table(),
                Self::parent_column()
            ),
            [parent.as_key()],
            |row| row.get(0),
        )?;
        Ok(max + 1)
    }

    /// Swap `id` with its left or right neighbour
    pub fn move_adjacent(&self, id: T::Id, direction: Direction) -> Result<MoveOutcome<T::Id>> {
        let slot = self.locate(id)?;
        let target = slot.position + direction.offset();

        let neighbour: Option<String> = self
            .conn
            .query_row(
                &format!(
                    "SELECT id FROM {} WHERE {} = ?1 AND position = ?2",
                    Self::table(),
                    Self::parent_column()
                ),
                params![slot.parent.as_key(), target],
                |row| row.get(0),
            )
            .optional()?;

        let Some(neighbour) = neighbour else {
            let reason = NoOpReason::for_direction(direction);
            tracing::warn!(kind = %T::KIND, %id, position = slot.position, %reason, "move skipped");
            return Ok(MoveOutcome::NoOp { reason });
        };

        apply_assignments(
            self.conn,
            T::KIND,
            self.temp_base,
            &[(id.as_key(), target), (neighbour.clone(), slot.position)],
        )?;
        self.touch(&[id.as_key(), neighbour.clone()])?;

        tracing::info!(
            kind = %T::KIND,
            %id,
            %neighbour,
            from = slot.position,
            to = target,
            "swapped positions"
        );
        Ok(MoveOutcome::Moved {
            siblings: self.siblings(slot.parent)?,
        })
    }

    /// Assign positions `1..=n` in the order given.
    ///
    /// `ordered` must be exactly the live sibling set of `parent`; anything
    /// else is rejected before a row is written.
    pub fn bulk_reorder(
        &self,
        parent: T::ParentId,
        ordered: &[T::Id],
    ) -> Result<Vec<Placement<T::Id>>> {
        let current = self.siblings(parent)?;
        check_permutation(&current, ordered)?;

        let assignments: Vec<(String, i64)> = ordered
            .iter()
            .enumerate()
            .map(|(index, id)| (id.as_key(), index as i64 + 1))
            .collect();
        apply_assignments(self.conn, T::KIND, self.temp_base, &assignments)?;

        let keys: Vec<String> = assignments.into_iter().map(|(key, _)| key).collect();
        self.touch(&keys)?;

        tracing::info!(kind = %T::KIND, %parent, count = ordered.len(), "reordered siblings");
        self.siblings(parent)
    }

    /// Delete `id` and close the gap it leaves
    pub fn remove(&self, id: T::Id) -> Result<Slot<T::ParentId>> {
        let slot = self.locate(id)?;
        self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", Self::table()),
            [id.as_key()],
        )?;
        shift_from(
            self.conn,
            T::KIND,
            self.temp_base,
            &slot.parent.as_key(),
            slot.position + 1,
            -1,
        )?;
        tracing::info!(kind = %T::KIND, %id, parent = %slot.parent, position = slot.position, "removed");
        Ok(slot)
    }

    /// Move `id` under `new_parent` at `target` (1-based), or at the end.
    ///
    /// `ancestors` are the cached ancestor columns the item must hold under
    /// its new parent; they are written in the same statement as the parent
    /// change. Descendant caches are the caller's cascade step.
    pub fn reparent(
        &self,
        id: T::Id,
        new_parent: T::ParentId,
        target: Option<i64>,
        ancestors: &[AncestorRef],
    ) -> Result<ReparentOutcome<T::Id, T::ParentId>> {
        if let Some(position) = target {
            if position < 1 {
                return Err(ValidationError::NonPositivePosition(position).into());
            }
        }

        let from = self.locate(id)?;
        self.ensure_parent(new_parent)?;

        if from.parent == new_parent {
            if let Some(position) = target {
                let max = self.count(new_parent)?;
                if position > max {
                    return Err(ValidationError::PositionOutOfRange { position, max }.into());
                }
            }
            return Ok(ReparentOutcome::Unchanged { slot: from });
        }

        let max = self.count(new_parent)? + 1;
        let position = target.unwrap_or(max);
        if position > max {
            return Err(ValidationError::PositionOutOfRange { position, max }.into());
        }

        // Make room in the destination
        shift_from(
            self.conn,
            T::KIND,
            self.temp_base,
            &new_parent.as_key(),
            position,
            1,
        )?;

        // Parent, position and cached ancestors in one write
        let mut assignments = vec![
            format!("{} = ?1", Self::parent_column()),
            "position = ?2".to_string(),
            "updated_at = ?3".to_string(),
        ];
        let mut values: Vec<Value> = vec![
            new_parent.as_key().into(),
            position.into(),
            now_rfc3339().into(),
        ];
        for ancestor in ancestors {
            values.push(ancestor.value.clone().into());
            assignments.push(format!("{} = ?{}", ancestor.column, values.len()));
        }
        values.push(id.as_key().into());
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            Self::table(),
            assignments.join(", "),
            values.len()
        );
        self.conn.execute(&sql, params_from_iter(values))?;

        // Close the gap in the source
        shift_from(
            self.conn,
            T::KIND,
            self.temp_base,
            &from.parent.as_key(),
            from.position + 1,
            -1,
        )?;

        tracing::info!(
            kind = %T::KIND,
            %id,
            from_parent = %from.parent,
            from_position = from.position,
            to_parent = %new_parent,
            to_position = position,
            "reparented"
        );

        Ok(ReparentOutcome::Moved(ReparentReport {
            id,
            from,
            to: Slot {
                parent: new_parent,
                position,
            },
            source_siblings: self.siblings(from.parent)?,
            target_siblings: self.siblings(new_parent)?,
            descendants_synced: 0,
        }))
    }

    /// Rewrite the positions under `parent` to `1..=n`, keeping the current
    /// order (ties broken by creation time). Returns rows whose position
    /// changed.
    pub fn renumber(&self, parent: T::ParentId) -> Result<usize> {
        let current = self.siblings(parent)?;
        let changed = current
            .iter()
            .enumerate()
            .filter(|(index, placement)| placement.position != *index as i64 + 1)
            .count();
        if changed == 0 {
            return Ok(0);
        }

        let assignments: Vec<(String, i64)> = current
            .iter()
            .enumerate()
            .map(|(index, placement)| (placement.id.as_key(), index as i64 + 1))
            .collect();
        apply_assignments(self.conn, T::KIND, self.temp_base, &assignments)?;
        tracing::info!(kind = %T::KIND, %parent, changed, "renumbered siblings");
        Ok(changed)
    }

    /// Distinct parents that currently have children at this level
    pub fn parents(&self) -> Result<Vec<T::ParentId>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT DISTINCT {0} FROM {1} ORDER BY {0}",
            Self::parent_column(),
            Self::table()
        ))?;
        let rows = stmt.query_map([], |row| {
            let key: String = row.get(0)?;
            parse_id(&key)
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Positions under `parent` if they are not exactly `1..=n`
    pub fn audit(&self, parent: T::ParentId) -> Result<Option<PositionDefect>> {
        let positions: Vec<i64> = self.siblings(parent)?.iter().map(|p| p.position).collect();
        let dense = positions
            .iter()
            .enumerate()
            .all(|(index, position)| *position == index as i64 + 1);
        if dense {
            return Ok(None);
        }
        Ok(Some(PositionDefect {
            kind: T::KIND,
            parent: parent.as_key(),
            positions,
        }))
    }

    fn ensure_parent(&self, parent: T::ParentId) -> Result<()> {
        let exists: bool = self.conn.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)",
                T::PARENT_KIND.table()
            ),
            [parent.as_key()],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(ScriptError::not_found(T::PARENT_KIND, parent));
        }
        Ok(())
    }

    fn touch(&self, keys: &[String]) -> Result<()> {
        let now = now_rfc3339();
        let mut stmt = self.conn.prepare_cached(&format!(
            "UPDATE {} SET updated_at = ?1 WHERE id = ?2",
            Self::table()
        ))?;
        for key in keys {
            stmt.execute(params![now, key])?;
        }
        Ok(())
    }
}

/// Reject an ordering that is not exactly the current sibling set
fn check_permutation<Id: EntityId>(current: &[Placement<Id>], ordered: &[Id]) -> Result<()> {
    let live: HashSet<Id> = current.iter().map(|p| p.id).collect();

    let mut seen: HashMap<Id, usize> = HashMap::new();
    for id in ordered {
        *seen.entry(*id).or_default() += 1;
    }

    let mut missing: Vec<String> = current
        .iter()
        .filter(|p| !seen.contains_key(&p.id))
        .map(|p| p.id.to_string())
        .collect();
    let mut unexpected: Vec<String> = seen
        .keys()
        .filter(|id| !live.contains(id))
        .map(|id| id.to_string())
        .collect();
    let mut duplicated: Vec<String> = seen
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(id, _)| id.to_string())
        .collect();

    if missing.is_empty() && unexpected.is_empty() && duplicated.is_empty() {
        return Ok(());
    }

    missing.sort();
    unexpected.sort();
    duplicated.sort();
    Err(ValidationError::NotAPermutation {
        missing,
        unexpected,
        duplicated,
    }
    .into())
}
