//! Configuration for scriptwright-core
//!
//! Database connection settings, staging parameters for the two-phase
//! position writes, and field limits enforced on create.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest accepted `temp_position_base`; leaves headroom for the sibling
/// index and position added to it when staging
pub const MAX_TEMP_POSITION_BASE: i64 = i64::MAX / 4;

/// System-wide configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptwrightConfig {
    /// Database connection settings
    pub database: DatabaseConfig,
    /// Position staging settings
    pub positioning: PositioningConfig,
    /// Field limits
    pub limits: LimitsConfig,
}

/// SQLite journal mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    Wal,
    Delete,
    Memory,
}

impl JournalMode {
    pub fn pragma_value(&self) -> &'static str {
        match self {
            JournalMode::Wal => "WAL",
            JournalMode::Delete => "DELETE",
            JournalMode::Memory => "MEMORY",
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file; `None` means in-memory
    pub path: Option<PathBuf>,
    /// How long a writer waits for the SQLite write lock before failing
    pub busy_timeout_ms: u32,
    /// Journal mode applied on open
    pub journal_mode: JournalMode,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: 5_000,
            journal_mode: JournalMode::Wal,
        }
    }
}

/// Position staging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositioningConfig {
    /// Staged rows take values `-(temp_position_base + i)`
    pub temp_position_base: i64,
}

impl Default for PositioningConfig {
    fn default() -> Self {
        Self {
            temp_position_base: 1_000,
        }
    }
}

/// Field limits, matching the column sizes of the original forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub act_title_max: usize,
    pub sequence_title_max: usize,
    pub scene_title_max: usize,
    pub time_of_day_max: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            act_title_max: 100,
            sequence_title_max: 100,
            scene_title_max: 200,
            time_of_day_max: 20,
        }
    }
}

impl ScriptwrightConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults pointed at a database file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.database.path = Some(path.into());
        config
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Staged values must stay strictly negative and fit in an i64
        let base = self.positioning.temp_position_base;
        if base < 1 {
            return Err(ConfigError::OutOfRange(
                "temp_position_base must be positive".to_string(),
            ));
        }
        if base > MAX_TEMP_POSITION_BASE {
            return Err(ConfigError::OutOfRange(format!(
                "temp_position_base must be at most {MAX_TEMP_POSITION_BASE}"
            )));
        }

        let limits = [
            ("act_title_max", self.limits.act_title_max),
            ("sequence_title_max", self.limits.sequence_title_max),
            ("scene_title_max", self.limits.scene_title_max),
            ("time_of_day_max", self.limits.time_of_day_max),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(ConfigError::OutOfRange(format!("{name} must be positive")));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScriptwrightConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.database.journal_mode, JournalMode::Wal);
        assert!(config.database.path.is_none());
    }

    #[test]
    fn test_json_serialization() {
        let config = ScriptwrightConfig::with_path("/tmp/script.db");
        let json = config.to_json().unwrap();
        let parsed = ScriptwrightConfig::from_json(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ScriptwrightConfig::from_toml(
            r#"
            [database]
            path = "studio.db"
            journal_mode = "delete"

            [limits]
            scene_title_max = 80
            "#,
        )
        .unwrap();
        assert_eq!(config.database.path, Some(PathBuf::from("studio.db")));
        assert_eq!(config.database.journal_mode, JournalMode::Delete);
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert_eq!(config.limits.scene_title_max, 80);
        assert_eq!(config.limits.act_title_max, 100);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ScriptwrightConfig::with_path("a.db");
        let text = config.to_toml().unwrap();
        assert_eq!(ScriptwrightConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let err = ScriptwrightConfig::from_json("{\"database\": ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = ScriptwrightConfig::from_toml("[database\npath=").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_out_of_range() {
        let mut config = ScriptwrightConfig::default();
        config.positioning.temp_position_base = 0;
        assert!(config.validate().is_err());

        let mut config = ScriptwrightConfig::default();
        config.limits.scene_title_max = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_temp_position_base_upper_bound() {
        let mut config = ScriptwrightConfig::default();
        config.positioning.temp_position_base = MAX_TEMP_POSITION_BASE;
        assert!(config.validate().is_ok());

        config.positioning.temp_position_base = MAX_TEMP_POSITION_BASE + 1;
        assert!(matches!(config.validate(), Err(ConfigError::OutOfRange(_))));

        config.positioning.temp_position_base = i64::MAX;
        assert!(config.validate().is_err());
    }
}
