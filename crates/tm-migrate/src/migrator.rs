//! Up, down, status and create, reconciling the source with the ledger.

use crate::error::{MigrateError, MigrateResult};
use crate::executor::Executor;
use crate::ledger::{AppliedSet, Ledger};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tm_core::{CreatedMigration, Direction, MigrationName, MigrationSource};
use tm_db::Database;

/// Outcome of an up run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpReport {
    /// Migrations applied by this run, in the order they ran
    pub applied: Vec<MigrationName>,
    /// Migrations skipped because the ledger already had them
    pub skipped: usize,
    /// Wall-clock duration of the run
    pub elapsed_ms: u128,
}

/// Where a migration stands relative to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationState {
    /// Present in the source and recorded in the ledger
    Applied,
    /// Present in the source, not yet recorded
    Pending,
    /// Recorded in the ledger but no longer in the source
    Missing,
}

impl std::fmt::Display for MigrationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationState::Applied => write!(f, "applied"),
            MigrationState::Pending => write!(f, "pending"),
            MigrationState::Missing => write!(f, "missing"),
        }
    }
}

/// One row of [`Migrator::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub name: String,
    pub state: MigrationState,
    pub applied_at: Option<NaiveDateTime>,
}

/// Drives migrations from a source against one database.
pub struct Migrator<'a> {
    source: &'a dyn MigrationSource,
    db: &'a dyn Database,
    ledger: Ledger,
}

impl<'a> Migrator<'a> {
    pub fn new(source: &'a dyn MigrationSource, db: &'a dyn Database, ledger: Ledger) -> Self {
        Self { source, db, ledger }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn executor(&self) -> Executor<'_> {
        Executor::new(self.source, &self.ledger, self.db)
    }

    /// Apply every pending migration in index order.
    pub fn up(&self) -> MigrateResult<UpReport> {
        self.up_with(|_| {})
    }

    /// Like [`Migrator::up`], calling `on_applied` after each migration commits.
    ///
    /// Stops at the first failure. Migrations committed before it stay applied.
    pub fn up_with(&self, mut on_applied: impl FnMut(&MigrationName)) -> MigrateResult<UpReport> {
        let started = Instant::now();
        self.ledger.ensure_schema(self.db)?;
        let applied = self.ledger.applied_names(self.db)?;
        let available = self.source.list().map_err(MigrateError::Discovery)?;

        let total = available.len();
        let pending = pending(&applied, available);
        let mut report = UpReport {
            skipped: total - pending.len(),
            ..UpReport::default()
        };

        if pending.is_empty() {
            log::info!("No pending migrations");
        }
        let executor = self.executor();
        for name in pending {
            executor.apply(&name, Direction::Up)?;
            log::info!("Applied migration {name}");
            on_applied(&name);
            report.applied.push(name);
        }

        report.elapsed_ms = started.elapsed().as_millis();
        Ok(report)
    }

    /// Revert the most recently applied migration.
    pub fn down(&self) -> MigrateResult<MigrationName> {
        self.ledger.ensure_schema(self.db)?;
        let name = self.ledger.last_applied(self.db)?;
        self.executor().apply(&name, Direction::Down)?;
        log::info!("Reverted migration {name}");
        Ok(name)
    }

    /// Every known migration with its state, source order first, then
    /// ledger entries whose scripts are gone.
    pub fn status(&self) -> MigrateResult<Vec<MigrationStatus>> {
        self.ledger.ensure_schema(self.db)?;
        let entries = self.ledger.entries(self.db)?;
        let available = self.source.list().map_err(MigrateError::Discovery)?;

        let applied_at: HashMap<&str, NaiveDateTime> = entries
            .iter()
            .map(|e| (e.name.as_str(), e.applied_at))
            .collect();
        let known: HashSet<&str> = available.iter().map(MigrationName::as_str).collect();

        let mut rows: Vec<MigrationStatus> = available
            .iter()
            .map(|name| {
                let at = applied_at.get(name.as_str()).copied();
                MigrationStatus {
                    name: name.to_string(),
                    state: if at.is_some() {
                        MigrationState::Applied
                    } else {
                        MigrationState::Pending
                    },
                    applied_at: at,
                }
            })
            .collect();

        rows.extend(
            entries
                .iter()
                .filter(|e| !known.contains(e.name.as_str()))
                .map(|e| MigrationStatus {
                    name: e.name.clone(),
                    state: MigrationState::Missing,
                    applied_at: Some(e.applied_at),
                }),
        );
        Ok(rows)
    }
}

/// Names in `available` with no ledger entry, keeping their order.
pub fn pending(applied: &AppliedSet, available: Vec<MigrationName>) -> Vec<MigrationName> {
    available
        .into_iter()
        .filter(|name| !applied.contains(name.as_str()))
        .collect()
}

/// Create empty up and down scripts named `<next index>_<slug>`.
pub fn create(
    source: &dyn MigrationSource,
    description: &str,
) -> MigrateResult<CreatedMigration> {
    let index = source.next_index().map_err(MigrateError::Discovery)?;
    let name = MigrationName::compose(index, description).map_err(MigrateError::Discovery)?;
    let created = source.create(&name).map_err(MigrateError::Discovery)?;
    log::info!("Created migration {}", created.name);
    Ok(created)
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
