//! Sequence: ordered within its act, caches the act's project

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::LimitsConfig;
use crate::error::ValidationError;
use crate::ids::{ActId, ProjectId, SequenceId};

use super::{validate_title, NodeKind, Positioned};

/// A sequence of scenes within an act
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub id: SequenceId,
    pub act_id: ActId,
    /// Cached `act.project_id`
    pub project_id: ProjectId,
    pub title: String,
    pub description: Option<String>,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Positioned for Sequence {
    type Id = SequenceId;
    type ParentId = ActId;

    const KIND: NodeKind = NodeKind::Sequence;
    const PARENT_KIND: NodeKind = NodeKind::Act;
}

/// Input for creating a sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewSequence {
    pub title: String,
    pub description: Option<String>,
}

impl NewSequence {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self, limits: &LimitsConfig) -> Result<(), ValidationError> {
        validate_title(NodeKind::Sequence, &self.title, limits.sequence_title_max)
    }
}
