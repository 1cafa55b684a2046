//! Down command implementation

use anyhow::{Context, Result};
use tm_migrate::Migrator;

use crate::cli::GlobalArgs;
use crate::commands::common::load_project;

/// Execute the down command
pub fn execute(global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = project.open_database(global)?;
    let source = project.source();
    let migrator = Migrator::new(&source, &db, project.ledger()?);

    let name = migrator.down().context("Failed to revert migration")?;
    println!("Reverted migration: {name}");
    Ok(())
}
