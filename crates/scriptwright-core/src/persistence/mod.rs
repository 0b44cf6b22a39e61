//! SQLite persistence for the project hierarchy

mod acts;
mod integrity;
mod repository;
pub(crate) mod rows;
mod scenes;
mod schema;
mod sequences;

pub(crate) use acts::list_acts;
pub use integrity::{IntegrityReport, RepairSummary};
pub use repository::Repository;
pub(crate) use scenes::list_project_scenes;
pub use schema::{Schema, SCHEMA_VERSION};
pub(crate) use sequences::list_project_sequences;
