//! Shared project loading and wiring used by every command.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tm_core::{Config, FsSource};
use tm_db::{Database, DuckDbBackend};
use tm_migrate::Ledger;

use crate::cli::GlobalArgs;

/// A loaded project: its root directory and configuration.
#[derive(Debug)]
pub(crate) struct Project {
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    /// Script source over the configured up and down directories.
    pub(crate) fn source(&self) -> FsSource {
        FsSource::new(
            self.config.up_dir_absolute(&self.root),
            self.config.down_dir_absolute(&self.root),
        )
    }

    /// Ledger handle for the configured table.
    pub(crate) fn ledger(&self) -> Result<Ledger> {
        let ledger =
            Ledger::new(self.config.migrations.table.clone()).context("Invalid ledger table name")?;
        log::debug!("Using ledger table {}", ledger.table());
        Ok(ledger)
    }

    /// Open the database, honouring a `--database` override.
    pub(crate) fn open_database(&self, global: &GlobalArgs) -> Result<DuckDbBackend> {
        let path = self
            .config
            .database_path(&self.root, global.database.as_deref());
        let db = DuckDbBackend::new(&path)
            .with_context(|| format!("Failed to open database: {path}"))?;
        log::debug!("Opened {} database {path}", db.db_type());
        Ok(db)
    }
}

/// Load the project configuration from `--project-dir`.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let root = PathBuf::from(&global.project_dir);
    let config = Config::load_from_dir(&root).context("Failed to load project")?;
    Ok(Project { root, config })
}
