//! Scriptwright Admin
//!
//! Maintenance console for a scriptwright database: integrity checks,
//! position repair and structure dumps. Opening a database migrates it to
//! the current schema.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use scriptwright_core::{OwnershipGate, ProjectId, Repository, ScriptError, ScriptwrightConfig};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Maintenance console for scriptwright databases")]
struct Cli {
    /// Database file (overrides `database.path` from the config file)
    #[arg(long)]
    db: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report gapped or duplicated positions and stale cached ancestor ids.
    Check,
    /// Recompute cached ancestor ids and renumber every sibling set.
    Repair,
    /// Print the ordered act/sequence/scene tree of a project as JSON.
    Tree {
        #[arg(long)]
        project: ProjectId,
    },
    /// Print node counts of a project.
    Stats {
        #[arg(long)]
        project: ProjectId,
    },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let path = config.database.path.clone();
    let mut repo = Repository::open(config)?;
    tracing::info!(?path, schema_version = repo.schema_version()?, "opened database");

    match cli.command {
        Command::Check => {
            let report = repo.check_integrity()?;
            print_json(&report)?;
            if !report.is_clean() {
                return Ok(ExitCode::from(1));
            }
        }
        Command::Repair => {
            let summary = repo.repair()?;
            print_json(&summary)?;
        }
        Command::Tree { project } => {
            let scope = admin_scope(&repo, project)?;
            print_json(&repo.structure(&scope)?)?;
        }
        Command::Stats { project } => {
            let scope = admin_scope(&repo, project)?;
            print_json(&repo.stats(&scope)?)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn load_config(cli: &Cli) -> Result<ScriptwrightConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => ScriptwrightConfig::from_toml(&std::fs::read_to_string(path)?)?,
        None => ScriptwrightConfig::default(),
    };
    if let Some(db) = &cli.db {
        config.database.path = Some(db.clone());
    }
    if config.database.path.is_none() {
        return Err("no database given; pass --db or set database.path".into());
    }
    Ok(config)
}

/// Scope under the project's own owner; the console is trusted tooling
fn admin_scope(
    repo: &Repository,
    project: ProjectId,
) -> Result<scriptwright_core::ProjectScope, ScriptError> {
    let owner = repo
        .get_project(project)?
        .map(|p| p.owner_id)
        .ok_or(ScriptError::NotFound {
            kind: scriptwright_core::NodeKind::Project,
            id: project.to_string(),
        })?;
    repo.authorize(&owner, project)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use scriptwright_core::{NewAct, NewProject, OwnerId};

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_db_flag_overrides_config() {
        let cli = Cli::parse_from(["scriptwright-admin", "--db", "/tmp/a.db", "check"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/a.db")));
    }

    #[test]
    fn test_admin_scope_uses_stored_owner() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::new(dir.path().join("admin.db")).unwrap();
        let owner = OwnerId::new("writer");
        let project = repo
            .create_project(NewProject::new(owner.clone(), "P"))
            .unwrap();
        let scope = admin_scope(&repo, project.id).unwrap();
        repo.create_act(&scope, NewAct::new("One")).unwrap();
        assert_eq!(repo.stats(&scope).unwrap().acts, 1);

        assert!(admin_scope(&repo, ProjectId::new())
            .unwrap_err()
            .is_not_found());
    }
}
