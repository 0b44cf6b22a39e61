//! Error types for scriptwright-core

use thiserror::Error;

use crate::hierarchy::NodeKind;

/// Result type alias for scriptwright operations
pub type Result<T> = std::result::Result<T, ScriptError>;

/// Main error type for hierarchy operations
#[derive(Error, Debug)]
pub enum ScriptError {
    /// Malformed caller input, never retried
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Referenced item or parent does not exist or is outside the caller's project
    #[error("{kind} not found: {id}")]
    NotFound { kind: NodeKind, id: String },

    /// The store rejected a write (unique, foreign key, check or trigger abort)
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Any other storage failure
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ScriptError {
    pub(crate) fn not_found(kind: NodeKind, id: impl ToString) -> Self {
        ScriptError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Whether the error means "nothing there" rather than a failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, ScriptError::NotFound { .. })
    }
}

/// Input validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Positions are 1-based
    #[error("position must be at least 1, got {0}")]
    NonPositivePosition(i64),

    /// Target position beyond the end of the destination sibling set
    #[error("position {position} is out of range (max {max})")]
    PositionOutOfRange { position: i64, max: i64 },

    /// Reorder list does not match the live sibling set
    #[error(
        "ordering is not a permutation of the current siblings (missing: {missing:?}, unexpected: {unexpected:?}, duplicated: {duplicated:?})"
    )]
    NotAPermutation {
        missing: Vec<String>,
        unexpected: Vec<String>,
        duplicated: Vec<String>,
    },

    /// Required title missing
    #[error("{0} title must not be blank")]
    BlankTitle(NodeKind),

    /// Title longer than the configured limit
    #[error("{kind} title is {len} characters, limit is {max}")]
    TitleTooLong { kind: NodeKind, len: usize, max: usize },

    /// Scene colour is not `#RRGGBB`
    #[error("invalid color {0:?}, expected #RRGGBB")]
    InvalidColor(String),

    /// Scene time of day longer than the column allows
    #[error("time of day is {len} characters, limit is {max}")]
    TimeOfDayTooLong { len: usize, max: usize },
}

/// Persistence-specific errors
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Database was written by a newer schema than this build knows
    #[error("Schema version mismatch: expected {expected}, got {actual}")]
    SchemaVersionMismatch { expected: u32, actual: u32 },
}

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Value is out of valid range
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// Configuration text could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<rusqlite::Error> for ScriptError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref failure, _) = err {
            if failure.code == rusqlite::ErrorCode::ConstraintViolation {
                return ScriptError::ConstraintViolation(err.to_string());
            }
        }
        ScriptError::Persistence(PersistenceError::Database(err.to_string()))
    }
}
