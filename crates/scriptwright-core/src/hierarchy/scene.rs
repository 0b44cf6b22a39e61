//! Scene: ordered within its sequence, caches act and project

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::LimitsConfig;
use crate::error::ValidationError;
use crate::ids::{ActId, ProjectId, SceneId, SequenceId};

use super::{validate_title, NodeKind, Positioned};

/// Colour given to scenes created without one
pub const DEFAULT_SCENE_COLOR: &str = "#FFFFFF";

/// A scene of the screenplay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,
    pub sequence_id: SequenceId,
    /// Cached `sequence.act_id`
    pub act_id: ActId,
    /// Cached `sequence.project_id`
    pub project_id: ProjectId,
    pub title: String,
    pub description: Option<String>,
    /// `#RRGGBB` card colour
    pub color: String,
    /// Scene heading time, e.g. `DAY` or `NIGHT`
    pub time_of_day: Option<String>,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Positioned for Scene {
    type Id = SceneId;
    type ParentId = SequenceId;

    const KIND: NodeKind = NodeKind::Scene;
    const PARENT_KIND: NodeKind = NodeKind::Sequence;
}

/// Input for creating a scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewScene {
    pub title: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub time_of_day: Option<String>,
}

impl NewScene {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_time_of_day(mut self, time_of_day: impl Into<String>) -> Self {
        self.time_of_day = Some(time_of_day.into());
        self
    }

    /// Colour to store, falling back to white
    pub fn color_or_default(&self) -> &str {
        match self.color.as_deref() {
            Some(color) if !color.trim().is_empty() => color,
            _ => DEFAULT_SCENE_COLOR,
        }
    }

    pub fn validate(&self, limits: &LimitsConfig) -> Result<(), ValidationError> {
        validate_title(NodeKind::Scene, &self.title, limits.scene_title_max)?;

        if let Some(color) = self.color.as_deref() {
            if !color.trim().is_empty() && !is_hex_color(color) {
                return Err(ValidationError::InvalidColor(color.to_string()));
            }
        }

        if let Some(time) = self.time_of_day.as_deref() {
            let len = time.chars().count();
            if len > limits.time_of_day_max {
                return Err(ValidationError::TimeOfDayTooLong {
                    len,
                    max: limits.time_of_day_max,
                });
            }
        }

        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
}
