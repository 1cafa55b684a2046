//! Up command implementation

use anyhow::{Context, Result};
use tm_migrate::Migrator;

use crate::cli::GlobalArgs;
use crate::commands::common::load_project;

/// Execute the up command
pub fn execute(global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = project.open_database(global)?;
    let source = project.source();
    let migrator = Migrator::new(&source, &db, project.ledger()?);

    let report = migrator
        .up_with(|name| println!("Applied migration: {name}"))
        .context("Migration run aborted")?;

    if report.applied.is_empty() {
        println!("No migrations to run");
    } else if global.verbose {
        println!(
            "\n{} applied, {} already applied ({}ms)",
            report.applied.len(),
            report.skipped,
            report.elapsed_ms
        );
    }
    Ok(())
}
