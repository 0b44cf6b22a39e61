//! SQLite schema for project structure storage

/// Schema version for migrations
pub const SCHEMA_VERSION: u32 = 2;

/// SQLite schema definition
pub struct Schema;

impl Schema {
    /// Tables and lookup indexes at the current version.
    ///
    /// The per-parent position indexes live in [`Schema::position_indexes`]
    /// because a migrating database must be renumbered before they can be
    /// created.
    pub fn create_tables() -> &'static str {
        r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Projects (hierarchy root, owned by one user)
CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    title TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_projects_owner ON projects(owner_id);

-- Acts (ordered within a project)
CREATE TABLE IF NOT EXISTS acts (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    description TEXT,
    position INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Sequences (ordered within an act, project cached)
CREATE TABLE IF NOT EXISTS sequences (
    id TEXT PRIMARY KEY,
    act_id TEXT NOT NULL REFERENCES acts(id) ON DELETE CASCADE,
    project_id TEXT REFERENCES projects(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    description TEXT,
    position INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sequences_project ON sequences(project_id);

-- Scenes (ordered within a sequence, act and project cached)
CREATE TABLE IF NOT EXISTS scenes (
    id TEXT PRIMARY KEY,
    sequence_id TEXT NOT NULL REFERENCES sequences(id) ON DELETE CASCADE,
    act_id TEXT REFERENCES acts(id) ON DELETE CASCADE,
    project_id TEXT REFERENCES projects(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    description TEXT,
    color TEXT NOT NULL DEFAULT '#FFFFFF',
    time_of_day TEXT,
    position INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_scenes_act ON scenes(act_id);
CREATE INDEX IF NOT EXISTS idx_scenes_project ON scenes(project_id);
"#
    }

    /// One position per slot within each parent
    pub fn position_indexes() -> &'static str {
        r#"
CREATE UNIQUE INDEX IF NOT EXISTS idx_acts_position ON acts(project_id, position);
CREATE UNIQUE INDEX IF NOT EXISTS idx_sequences_position ON sequences(act_id, position);
CREATE UNIQUE INDEX IF NOT EXISTS idx_scenes_position ON scenes(sequence_id, position);
"#
    }

    /// Get migration SQL for a specific version
    pub fn migration(from_version: u32, to_version: u32) -> Option<&'static str> {
        match (from_version, to_version) {
            // Cached ancestor columns, backfilled from the parent chain
            (1, 2) => Some(
                r#"
ALTER TABLE sequences ADD COLUMN project_id TEXT REFERENCES projects(id) ON DELETE CASCADE;
ALTER TABLE scenes ADD COLUMN act_id TEXT REFERENCES acts(id) ON DELETE CASCADE;
ALTER TABLE scenes ADD COLUMN project_id TEXT REFERENCES projects(id) ON DELETE CASCADE;

UPDATE sequences
SET project_id = (SELECT a.project_id FROM acts a WHERE a.id = sequences.act_id);

UPDATE scenes
SET act_id = (SELECT s.act_id FROM sequences s WHERE s.id = scenes.sequence_id),
    project_id = (SELECT s.project_id FROM sequences s WHERE s.id = scenes.sequence_id);

CREATE INDEX IF NOT EXISTS idx_sequences_project ON sequences(project_id);
CREATE INDEX IF NOT EXISTS idx_scenes_act ON scenes(act_id);
CREATE INDEX IF NOT EXISTS idx_scenes_project ON scenes(project_id);
"#,
            ),
            _ => None,
        }
    }
}
