//! Act: ordered within its project

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::LimitsConfig;
use crate::error::ValidationError;
use crate::ids::{ActId, ProjectId};

use super::{validate_title, NodeKind, Positioned};

/// An act of a screenplay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Act {
    pub id: ActId,
    pub project_id: ProjectId,
    pub title: String,
    pub description: Option<String>,
    /// 1-based, dense within the project
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Positioned for Act {
    type Id = ActId;
    type ParentId = ProjectId;

    const KIND: NodeKind = NodeKind::Act;
    const PARENT_KIND: NodeKind = NodeKind::Project;
}

/// Input for creating an act; the position is always appended
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewAct {
    pub title: String,
    pub description: Option<String>,
}

impl NewAct {
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
        validate_title(NodeKind::Act, &self.title, limits.act_title_max)
    }
}
