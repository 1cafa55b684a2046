//! Status command implementation

use anyhow::{Context, Result};
use tm_migrate::{MigrationStatus, Migrator};

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::load_project;

/// Execute the status command
pub fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = project.open_database(global)?;
    let source = project.source();
    let migrator = Migrator::new(&source, &db, project.ledger()?);

    let status = migrator.status().context("Failed to read migration status")?;

    match args.output {
        StatusOutput::Table => print_table(&status),
        StatusOutput::Json => print_json(&status)?,
    }
    Ok(())
}

fn print_table(status: &[MigrationStatus]) {
    if status.is_empty() {
        println!("No migrations found.");
        return;
    }

    let name_width = status
        .iter()
        .map(|s| s.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    println!("{:<name_width$}  {:<8}  APPLIED AT", "NAME", "STATE");
    println!("{}", "-".repeat(name_width + 2 + 8 + 2 + 23));
    for row in status {
        let applied_at = row
            .applied_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<name_width$}  {:<8}  {}",
            row.name,
            row.state.to_string(),
            applied_at
        );
    }

    let pending = status
        .iter()
        .filter(|s| s.state == tm_migrate::MigrationState::Pending)
        .count();
    println!("\n{} migration(s), {} pending", status.len(), pending);
}

fn print_json(status: &[MigrationStatus]) -> Result<()> {
    let json = serde_json::to_string_pretty(status)?;
    println!("{json}");
    Ok(())
}
