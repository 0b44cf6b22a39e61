//! Integrity audit and repair
//!
//! Normal operation keeps every sibling set dense and every cached ancestor
//! id current. These routines exist for databases written before the unique
//! position indexes, or edited by hand.

use rusqlite::Connection;
use serde::Serialize;

use super::repository::Repository;
use crate::config::PositioningConfig;
use crate::error::Result;
use crate::hierarchy::ancestry::{resync_all, stale_references};
use crate::hierarchy::{Act, Positioned, Scene, Sequence, StaleReference};
use crate::positioning::{PositionDefect, PositionedCollection};

/// Findings of [`Repository::check_integrity`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub position_defects: Vec<PositionDefect>,
    pub stale_references: Vec<StaleReference>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.position_defects.is_empty() && self.stale_references.is_empty()
    }
}

/// What [`Repository::repair`] changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepairSummary {
    /// Rows whose position was rewritten
    pub renumbered: usize,
    /// Rows whose cached ancestor ids were rewritten
    pub resynced: usize,
}

fn audit_level<T: Positioned>(
    conn: &Connection,
    positioning: &PositioningConfig,
) -> Result<Vec<PositionDefect>> {
    let collection = PositionedCollection::<T>::new(conn, positioning);
    let mut defects = Vec::new();
    for parent in collection.parents()? {
        if let Some(defect) = collection.audit(parent)? {
            defects.push(defect);
        }
    }
    Ok(defects)
}

fn renumber_level<T: Positioned>(
    conn: &Connection,
    positioning: &PositioningConfig,
) -> Result<usize> {
    let collection = PositionedCollection::<T>::new(conn, positioning);
    let mut changed = 0;
    for parent in collection.parents()? {
        changed += collection.renumber(parent)?;
    }
    Ok(changed)
}

/// Renumber every sibling set at every level to `1..=n`
pub(crate) fn renumber_all(conn: &Connection, positioning: &PositioningConfig) -> Result<usize> {
    Ok(renumber_level::<Act>(conn, positioning)?
        + renumber_level::<Sequence>(conn, positioning)?
        + renumber_level::<Scene>(conn, positioning)?)
}

impl Repository {
    /// Report non-dense sibling sets and stale cached ancestor ids
    pub fn check_integrity(&self) -> Result<IntegrityReport> {
        let positioning = self.config().positioning.clone();
        self.read(|conn| {
            let mut position_defects = audit_level::<Act>(conn, &positioning)?;
            position_defects.extend(audit_level::<Sequence>(conn, &positioning)?);
            position_defects.extend(audit_level::<Scene>(conn, &positioning)?);

            let report = IntegrityReport {
                position_defects,
                stale_references: stale_references(conn)?,
            };
            tracing::info!(
                position_defects = report.position_defects.len(),
                stale_references = report.stale_references.len(),
                "integrity check"
            );
            Ok(report)
        })
    }

    /// Recompute cached ancestor ids, then renumber every sibling set
    pub fn repair(&mut self) -> Result<RepairSummary> {
        self.write("repair", |conn, config| {
            let resynced = resync_all(conn)?;
            let renumbered = renumber_all(conn, &config.positioning)?;
            tracing::info!(resynced, renumbered, "repaired");
            Ok(RepairSummary {
                renumbered,
                resynced,
            })
        })
    }

    /// Renumber every sibling set to `1..=n`, keeping the current order
    pub fn repair_positions(&mut self) -> Result<usize> {
        self.write("repair_positions", |conn, config| {
            renumber_all(conn, &config.positioning)
        })
    }

    /// Recompute cached ancestor ids only
    pub fn resync_ancestors(&mut self) -> Result<usize> {
        self.write("resync_ancestors", |conn, _| resync_all(conn))
    }
}
