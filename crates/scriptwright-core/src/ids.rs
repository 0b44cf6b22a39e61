//! Typed identifiers for hierarchy entities
//!
//! Every entity is keyed by a UUID. The newtypes keep an act id from being
//! passed where a sequence id is expected; storage sees the hyphenated string.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Common behaviour of the typed id wrappers, used by the generic
/// positioning engine to read and write id columns.
pub trait EntityId: Copy + Eq + std::hash::Hash + std::fmt::Debug + std::fmt::Display {
    /// Wrap a raw UUID
    fn from_uuid(uuid: Uuid) -> Self;

    /// The underlying UUID
    fn uuid(&self) -> Uuid;

    /// Storage representation (hyphenated lowercase)
    fn as_key(&self) -> String {
        self.uuid().to_string()
    }
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name {
            /// The underlying UUID value
            pub value: Uuid,
        }

        impl $name {
            /// Create a new random id
            pub fn new() -> Self {
                Self {
                    value: Uuid::new_v4(),
                }
            }

            /// Parse an id from its string form
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self {
                    value: Uuid::parse_str(s)?,
                })
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl EntityId for $name {
            fn from_uuid(uuid: Uuid) -> Self {
                Self { value: uuid }
            }

            fn uuid(&self) -> Uuid {
                self.value
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.value)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a screenwriting project (hierarchy root)
    ProjectId
);
entity_id!(
    /// Unique identifier for an act
    ActId
);
entity_id!(
    /// Unique identifier for a sequence
    SequenceId
);
entity_id!(
    /// Unique identifier for a scene
    SceneId
);

/// Opaque identity of the caller that owns a project.
///
/// Issued by the authentication layer; the core only compares it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
