//! Project: root of the hierarchy, owned by one caller

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ids::{OwnerId, ProjectId};

use super::{validate_title, NodeKind};

const PROJECT_TITLE_MAX: usize = 200;

/// A screenwriting project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub owner_id: OwnerId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub owner_id: OwnerId,
    pub title: String,
}

impl NewProject {
    pub fn new(owner_id: OwnerId, title: impl Into<String>) -> Self {
        Self {
            owner_id,
            title: title.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(NodeKind::Project, &self.title, PROJECT_TITLE_MAX)
    }
}
