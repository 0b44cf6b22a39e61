//! Repository owning the SQLite connection
//!
//! Per-level operations live in the sibling `acts`, `sequences` and `scenes`
//! modules as further `impl Repository` blocks. Every mutating operation runs
//! through [`Repository::write`], one `BEGIN IMMEDIATE` transaction per call.

use std::path::Path;
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::integrity::renumber_all;
use super::rows::{now_rfc3339, row_to_project, PROJECT_COLUMNS};
use super::schema::{Schema, SCHEMA_VERSION};
use crate::config::ScriptwrightConfig;
use crate::error::{PersistenceError, Result, ScriptError};
use crate::hierarchy::{NewProject, NodeKind, Project};
use crate::ids::{EntityId, OwnerId, ProjectId};
use crate::ownership::{OwnershipGate, ProjectScope};

/// Repository for persisting project structure
pub struct Repository {
    conn: Connection,
    config: ScriptwrightConfig,
}

impl Repository {
    /// Open the database named by `config`, in memory when it names none
    pub fn open(config: ScriptwrightConfig) -> Result<Self> {
        config.validate()?;
        let conn = match config.database.path.as_deref() {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };
        Self::from_connection(conn, config)
    }

    /// Create a new repository with the given database path
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(ScriptwrightConfig::with_path(path.as_ref()))
    }

    /// Create an in-memory repository (for testing)
    pub fn in_memory() -> Result<Self> {
        Self::open(ScriptwrightConfig::default())
    }

    /// Wrap an already open connection, migrating it if needed
    pub fn from_connection(conn: Connection, config: ScriptwrightConfig) -> Result<Self> {
        config.validate()?;
        let mut repo = Self { conn, config };
        repo.configure()?;
        repo.initialize()?;
        Ok(repo)
    }

    pub fn config(&self) -> &ScriptwrightConfig {
        &self.config
    }

    /// Raw connection, for diagnostics and tooling
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn configure(&self) -> Result<()> {
        let database = &self.config.database;
        self.conn.pragma_update(None, "foreign_keys", true)?;
        self.conn
            .busy_timeout(Duration::from_millis(u64::from(database.busy_timeout_ms)))?;

        if database.path.is_some() {
            let mode: String = self.conn.pragma_update_and_check(
                None,
                "journal_mode",
                database.journal_mode.pragma_value(),
                |row| row.get(0),
            )?;
            tracing::debug!(journal_mode = %mode, "configured connection");
        }
        Ok(())
    }

    /// Initialize the database schema
    fn initialize(&mut self) -> Result<()> {
        let current_version = self.schema_version()?;

        if current_version > SCHEMA_VERSION {
            return Err(PersistenceError::SchemaVersionMismatch {
                expected: SCHEMA_VERSION,
                actual: current_version,
            }
            .into());
        }

        if current_version == 0 {
            // Fresh database, create all tables
            let tx = self.conn.transaction()?;
            tx.execute_batch(Schema::create_tables())?;
            tx.execute_batch(Schema::position_indexes())?;
            set_schema_version(&tx, SCHEMA_VERSION)?;
            tx.commit()?;
            tracing::info!(version = SCHEMA_VERSION, "created schema");
        } else if current_version < SCHEMA_VERSION {
            self.migrate(current_version)?;
        }

        Ok(())
    }

    fn migrate(&mut self, from_version: u32) -> Result<()> {
        let positioning = self.config.positioning.clone();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        for version in from_version..SCHEMA_VERSION {
            if let Some(migration) = Schema::migration(version, version + 1) {
                tx.execute_batch(migration).map_err(|e| {
                    PersistenceError::Migration(format!("{version} -> {}: {e}", version + 1))
                })?;
                tracing::info!(from = version, to = version + 1, "applied migration");
            }
        }

        // Older databases may hold duplicate or gapped positions; the unique
        // indexes can only be created once every sibling set is dense.
        let renumbered = renumber_all(&tx, &positioning)?;
        tx.execute_batch(Schema::position_indexes())
            .map_err(|e| PersistenceError::Migration(format!("position indexes: {e}")))?;
        set_schema_version(&tx, SCHEMA_VERSION)?;
        tx.commit()?;

        tracing::info!(
            from = from_version,
            to = SCHEMA_VERSION,
            renumbered,
            "migrated schema"
        );
        Ok(())
    }

    /// Highest recorded schema version, 0 for an empty database
    pub fn schema_version(&self) -> Result<u32> {
        let has_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version')",
            [],
            |row| row.get(0),
        )?;
        if !has_table {
            return Ok(0);
        }
        let version: Option<u32> =
            self.conn
                .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                    row.get(0)
                })?;
        Ok(version.unwrap_or(0))
    }

    /// Run `op` in one immediate transaction, committing on success.
    ///
    /// The write lock is taken up front, so the read-then-write steps inside
    /// `op` (max position, sibling lists) cannot interleave with another
    /// writer. On error the transaction is dropped, which rolls it back.
    pub(crate) fn write<R>(
        &mut self,
        operation: &'static str,
        op: impl FnOnce(&Connection, &ScriptwrightConfig) -> Result<R>,
    ) -> Result<R> {
        let config = &self.config;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| {
                tracing::error!(operation, error = %e, "could not begin transaction");
                ScriptError::from(e)
            })?;

        match op(&*tx, config) {
            Ok(value) => {
                tx.commit().map_err(|e| {
                    tracing::error!(operation, error = %e, "commit failed");
                    ScriptError::from(e)
                })?;
                Ok(value)
            }
            Err(err) => {
                match &err {
                    ScriptError::Validation(_) | ScriptError::NotFound { .. } => {
                        tracing::warn!(operation, error = %err, "rejected")
                    }
                    _ => tracing::error!(operation, error = %err, "rolled back"),
                }
                Err(err)
            }
        }
    }

    /// Run `op` against a consistent snapshot
    pub(crate) fn read<R>(&self, op: impl FnOnce(&Connection) -> Result<R>) -> Result<R> {
        let tx = self.conn.unchecked_transaction()?;
        let value = op(&*tx)?;
        tx.commit()?;
        Ok(value)
    }

    // ==================== Project Operations ====================

    /// Create a project owned by `new.owner_id`
    pub fn create_project(&mut self, new: NewProject) -> Result<Project> {
        new.validate()?;
        let id = ProjectId::new();

        self.write("create_project", |conn, _| {
            let now = now_rfc3339();
            conn.execute(
                "INSERT INTO projects (id, owner_id, title, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![id.as_key(), new.owner_id.as_str(), new.title.trim(), now],
            )?;
            tracing::info!(project = %id, owner = %new.owner_id, "created project");
            fetch_project(conn, id)
        })
    }

    /// Get a project by id
    pub fn get_project(&self, id: ProjectId) -> Result<Option<Project>> {
        let project = self
            .conn
            .query_row(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
                [id.as_key()],
                row_to_project,
            )
            .optional()?;
        Ok(project)
    }

    /// Projects owned by `owner`, oldest first
    pub fn projects_for_owner(&self, owner: &OwnerId) -> Result<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE owner_id = ?1 ORDER BY created_at, id"
        ))?;
        let projects = stmt
            .query_map([owner.as_str()], row_to_project)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    /// Every project id, for maintenance tooling
    pub fn project_ids(&self) -> Result<Vec<ProjectId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM projects ORDER BY created_at, id")?;
        let ids = stmt
            .query_map([], |row| {
                let key: String = row.get(0)?;
                super::rows::parse_id(&key)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    /// Delete the scoped project and everything under it
    pub fn delete_project(&mut self, scope: &ProjectScope) -> Result<()> {
        let id = scope.project_id();
        self.write("delete_project", |conn, _| {
            scope.ensure_contains(conn, NodeKind::Project, id)?;
            conn.execute("DELETE FROM projects WHERE id = ?1", [id.as_key()])?;
            tracing::info!(project = %id, "deleted project");
            Ok(())
        })
    }
}

impl OwnershipGate for Repository {
    fn authorize(&self, owner: &OwnerId, project: ProjectId) -> Result<ProjectScope> {
        let stored: Option<String> = self
            .conn
            .query_row(
                "SELECT owner_id FROM projects WHERE id = ?1",
                [project.as_key()],
                |row| row.get(0),
            )
            .optional()?;

        match stored {
            Some(stored) if stored == owner.as_str() => {
                Ok(ProjectScope::new(project, owner.clone()))
            }
            _ => {
                tracing::debug!(%project, %owner, "authorization refused");
                Err(ScriptError::not_found(NodeKind::Project, project))
            }
        }
    }
}

fn set_schema_version(conn: &Connection, version: u32) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

fn fetch_project(conn: &Connection, id: ProjectId) -> Result<Project> {
    conn.query_row(
        &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
        [id.as_key()],
        row_to_project,
    )
    .optional()?
    .ok_or_else(|| ScriptError::not_found(NodeKind::Project, id))
}
