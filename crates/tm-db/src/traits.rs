//! Database trait definition

use crate::error::DbResult;

/// Database abstraction trait for Tidemark
///
/// Calls are blocking and issued from a single thread; one connection
/// serves the whole run.
pub trait Database {
    /// Execute a single SQL statement that returns no rows
    fn execute(&self, sql: &str) -> DbResult<()>;

    /// Execute a parameterized statement, returning affected rows.
    ///
    /// Parameters bind positionally to `?` placeholders as text.
    fn execute_with(&self, sql: &str, params: &[&str]) -> DbResult<usize>;

    /// Run a query and return every row with each column coerced to text
    fn query_rows(&self, sql: &str, params: &[&str]) -> DbResult<Vec<Vec<String>>>;

    /// Open a transaction on the connection
    fn begin(&self) -> DbResult<()>;

    /// Commit the open transaction
    fn commit(&self) -> DbResult<()>;

    /// Roll back the open transaction
    fn rollback(&self) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
