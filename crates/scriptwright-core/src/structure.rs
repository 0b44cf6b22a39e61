//! Nested read model of a project
//!
//! The editor renders the whole tree after each move; building it from the
//! three flat listings keeps it to three queries however large the project.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{Result, ScriptError};
use crate::hierarchy::{Act, NodeKind, Project, Scene, Sequence};
use crate::ids::{ActId, SequenceId};
use crate::ownership::ProjectScope;
use crate::persistence::{list_acts, list_project_scenes, list_project_sequences, Repository};

/// A project with its acts, sequences and scenes in order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectStructure {
    pub project: Project,
    pub acts: Vec<ActNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActNode {
    #[serde(flatten)]
    pub act: Act,
    pub sequences: Vec<SequenceNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceNode {
    #[serde(flatten)]
    pub sequence: Sequence,
    pub scenes: Vec<Scene>,
}

/// Node counts per level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StructureStats {
    pub acts: usize,
    pub sequences: usize,
    pub scenes: usize,
}

impl ProjectStructure {
    pub fn stats(&self) -> StructureStats {
        let sequences = self.acts.iter().map(|a| a.sequences.len()).sum();
        let scenes = self
            .acts
            .iter()
            .flat_map(|a| &a.sequences)
            .map(|s| s.scenes.len())
            .sum();
        StructureStats {
            acts: self.acts.len(),
            sequences,
            scenes,
        }
    }
}

impl Repository {
    /// Full ordered tree of the scoped project
    pub fn structure(&self, scope: &ProjectScope) -> Result<ProjectStructure> {
        let id = scope.project_id();
        let project = self
            .get_project(id)?
            .ok_or_else(|| ScriptError::not_found(NodeKind::Project, id))?;

        self.read(|conn| {
            let acts = list_acts(conn, id)?;
            let sequences = list_project_sequences(conn, id)?;
            let scenes = list_project_scenes(conn, id)?;

            let mut scenes_by_sequence: HashMap<SequenceId, Vec<Scene>> = HashMap::new();
            for scene in scenes {
                scenes_by_sequence
                    .entry(scene.sequence_id)
                    .or_default()
                    .push(scene);
            }

            let mut sequences_by_act: HashMap<ActId, Vec<SequenceNode>> = HashMap::new();
            for sequence in sequences {
                let scenes = scenes_by_sequence.remove(&sequence.id).unwrap_or_default();
                sequences_by_act
                    .entry(sequence.act_id)
                    .or_default()
                    .push(SequenceNode { sequence, scenes });
            }

            let acts = acts
                .into_iter()
                .map(|act| ActNode {
                    sequences: sequences_by_act.remove(&act.id).unwrap_or_default(),
                    act,
                })
                .collect();

            Ok(ProjectStructure { project, acts })
        })
    }

    /// Node counts of the scoped project
    pub fn stats(&self, scope: &ProjectScope) -> Result<StructureStats> {
        let key = scope.project_id().to_string();
        self.read(|conn| {
            let count = |table: &str| -> Result<usize> {
                let n: i64 = conn.query_row(
                    &format!("SELECT COUNT(*) FROM {table} WHERE project_id = ?1"),
                    [&key],
                    |row| row.get(0),
                )?;
                Ok(n as usize)
            };
            Ok(StructureStats {
                acts: count("acts")?,
                sequences: count("sequences")?,
                scenes: count("scenes")?,
            })
        })
    }
}
