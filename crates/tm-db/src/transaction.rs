//! Transaction handle and the `with_transaction` helper.

use crate::error::{DbError, DbResult};
use crate::traits::Database;

/// Proof that a transaction is open on the wrapped database.
///
/// Only [`with_transaction`] hands these out, so a function that takes a
/// `&Transaction` can never run outside one.
pub struct Transaction<'a> {
    db: &'a dyn Database,
}

impl Transaction<'_> {
    /// Execute a single statement inside the transaction
    pub fn execute(&self, sql: &str) -> DbResult<()> {
        self.db.execute(sql)
    }

    /// Execute a parameterized statement inside the transaction
    pub fn execute_with(&self, sql: &str, params: &[&str]) -> DbResult<usize> {
        self.db.execute_with(sql, params)
    }

    /// Query rows inside the transaction
    pub fn query_rows(&self, sql: &str, params: &[&str]) -> DbResult<Vec<Vec<String>>> {
        self.db.query_rows(sql, params)
    }
}

/// Execute `body` within a `BEGIN` / `COMMIT` transaction, rolling back on
/// error.
///
/// The body's error is returned unchanged after the rollback. A failed
/// rollback is logged rather than replacing the original error.
pub fn with_transaction<T, E, F>(db: &dyn Database, body: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<DbError>,
{
    db.begin()?;

    let result = body(&Transaction { db });

    match result {
        Ok(value) => {
            if let Err(commit_err) = db.commit() {
                if let Err(rollback_err) = db.rollback() {
                    log::warn!("ROLLBACK after failed COMMIT also failed: {rollback_err}");
                }
                return Err(commit_err.into());
            }
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = db.rollback() {
                log::warn!("ROLLBACK failed: {rollback_err}");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
#[path = "transaction_test.rs"]
mod tests;
