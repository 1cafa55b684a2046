//! Applies or reverts a single migration inside one transaction.

use crate::error::{MigrateError, MigrateResult};
use crate::ledger::Ledger;
use tm_core::{Direction, MigrationName, MigrationSource, Script};
use tm_db::{with_transaction, Database};

/// Runs one migration file against the database.
///
/// Holds no state of its own; every call reads the script afresh.
pub struct Executor<'a> {
    source: &'a dyn MigrationSource,
    ledger: &'a Ledger,
    db: &'a dyn Database,
}

impl<'a> Executor<'a> {
    pub fn new(source: &'a dyn MigrationSource, ledger: &'a Ledger, db: &'a dyn Database) -> Self {
        Self { source, ledger, db }
    }

    /// Run every statement of `name`'s `direction` script, then record
    /// (up) or remove (down) its ledger entry, all in one transaction.
    ///
    /// On any failure the transaction is rolled back and nothing of this
    /// migration persists.
    pub fn apply(&self, name: &MigrationName, direction: Direction) -> MigrateResult<()> {
        let text = self
            .source
            .open(name, direction)
            .map_err(|source| MigrateError::Load {
                name: name.to_string(),
                direction,
                source,
            })?;
        let script = Script::parse(&text).map_err(|source| MigrateError::Parse {
            name: name.to_string(),
            direction,
            source,
        })?;

        log::debug!("Running {direction} script for {name}");
        with_transaction(self.db, |tx| {
            for (i, statement) in script.statements().enumerate() {
                log::debug!("{name} [{direction}] statement {}", i + 1);
                tx.execute(&statement)
                    .map_err(|source| MigrateError::Execution {
                        name: name.to_string(),
                        direction,
                        source,
                    })?;
            }
            match direction {
                Direction::Up => self.ledger.record(name, tx),
                Direction::Down => self.ledger.unrecord(name, tx),
            }
        })
        .map_err(|e| e.in_migration(name.as_str(), direction))
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
