//! Ledger table recording which migrations have been applied.
//!
//! Inserts and deletes only happen through a caller's [`Transaction`], so a
//! ledger change always commits or rolls back together with the migration
//! statements that justify it.

use crate::error::{MigrateError, MigrateResult};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashSet;
use tm_core::config::validate_identifier;
use tm_core::{CoreResult, MigrationName};
use tm_db::{Database, Transaction};

/// Format DuckDB uses when casting `TIMESTAMP` to `VARCHAR`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// One applied migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub name: String,
    pub applied_at: NaiveDateTime,
}

/// Snapshot of applied migration names, in apply order.
///
/// Taken once per run; it does not track later changes to the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedSet {
    order: Vec<String>,
    lookup: HashSet<String>,
}

impl AppliedSet {
    /// Whether `name` has a ledger entry.
    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Names ordered by `applied_at` ascending.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for AppliedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = AppliedSet::default();
        for name in iter {
            let name = name.into();
            if set.lookup.insert(name.clone()) {
                set.order.push(name);
            }
        }
        set
    }
}

/// Handle on the ledger table.
#[derive(Debug, Clone)]
pub struct Ledger {
    table: String,
}

impl Ledger {
    /// Create a handle for `table`, which must be a bare SQL identifier.
    pub fn new(table: impl Into<String>) -> CoreResult<Self> {
        let table = table.into();
        validate_identifier(&table)?;
        Ok(Self { table })
    }

    /// Ledger table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the ledger table and its id sequence if absent.
    pub fn ensure_schema(&self, db: &dyn Database) -> MigrateResult<()> {
        let table = &self.table;
        db.execute(&format!(
            "CREATE SEQUENCE IF NOT EXISTS {table}_id_seq;
             CREATE TABLE IF NOT EXISTS {table} (
                 id         BIGINT PRIMARY KEY DEFAULT nextval('{table}_id_seq'),
                 name       VARCHAR NOT NULL UNIQUE,
                 applied_at TIMESTAMP NOT NULL DEFAULT now()
             );"
        ))
        .map_err(|source| MigrateError::SchemaSetup {
            table: table.clone(),
            source,
        })?;
        log::debug!("Ensured ledger table {table} exists");
        Ok(())
    }

    /// Every applied name, ordered by apply time.
    pub fn applied_names(&self, db: &dyn Database) -> MigrateResult<AppliedSet> {
        let rows = db
            .query_rows(
                &format!("SELECT name FROM {} ORDER BY applied_at ASC, id ASC", self.table),
                &[],
            )
            .map_err(|source| MigrateError::Ledger {
                operation: "read of applied migrations".to_string(),
                source,
            })?;
        Ok(rows.into_iter().filter_map(first_column).collect())
    }

    /// Every entry with its apply time, ordered by apply time.
    pub fn entries(&self, db: &dyn Database) -> MigrateResult<Vec<LedgerEntry>> {
        let rows = db
            .query_rows(
                &format!(
                    "SELECT name, CAST(applied_at AS VARCHAR) FROM {} \
                     ORDER BY applied_at ASC, id ASC",
                    self.table
                ),
                &[],
            )
            .map_err(|source| MigrateError::Ledger {
                operation: "read of ledger entries".to_string(),
                source,
            })?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let [name, applied_at]: [String; 2] = match row.try_into() {
                Ok(pair) => pair,
                Err(row) => {
                    log::warn!("Skipping malformed ledger row: {row:?}");
                    continue;
                }
            };
            match NaiveDateTime::parse_from_str(&applied_at, TIMESTAMP_FORMAT) {
                Ok(applied_at) => entries.push(LedgerEntry { name, applied_at }),
                Err(e) => log::warn!("Ledger entry '{name}' has unreadable applied_at '{applied_at}': {e}"),
            }
        }
        Ok(entries)
    }

    /// The most recently applied migration.
    pub fn last_applied(&self, db: &dyn Database) -> MigrateResult<MigrationName> {
        let rows = db
            .query_rows(
                &format!(
                    "SELECT name FROM {} ORDER BY applied_at DESC, id DESC LIMIT 1",
                    self.table
                ),
                &[],
            )
            .map_err(|source| MigrateError::Ledger {
                operation: "read of last applied migration".to_string(),
                source,
            })?;

        let name = rows
            .into_iter()
            .find_map(first_column)
            .ok_or(MigrateError::NoMigrationsApplied)?;
        MigrationName::parse(name.clone())
            .map_err(|source| MigrateError::CorruptLedger { name, source })
    }

    /// Insert an entry for `name` as part of `tx`.
    pub fn record(&self, name: &MigrationName, tx: &Transaction<'_>) -> MigrateResult<()> {
        tx.execute_with(
            &format!("INSERT INTO {} (name) VALUES (?)", self.table),
            &[name.as_str()],
        )
        .map_err(|source| MigrateError::Ledger {
            operation: format!("insert of '{name}'"),
            source,
        })?;
        log::debug!("Recorded {name} in {}", self.table);
        Ok(())
    }

    /// Delete the entry for `name` as part of `tx`.
    pub fn unrecord(&self, name: &MigrationName, tx: &Transaction<'_>) -> MigrateResult<()> {
        let deleted = tx
            .execute_with(
                &format!("DELETE FROM {} WHERE name = ?", self.table),
                &[name.as_str()],
            )
            .map_err(|source| MigrateError::Ledger {
                operation: format!("delete of '{name}'"),
                source,
            })?;
        if deleted == 0 {
            log::warn!("No ledger entry for {name} in {} to delete", self.table);
        }
        log::debug!("Removed {name} from {}", self.table);
        Ok(())
    }
}

fn first_column(row: Vec<String>) -> Option<String> {
    row.into_iter().next()
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
