//! Error types for the migration engine.

use thiserror::Error;
use tm_core::{CoreError, Direction};
use tm_db::DbError;

/// Migration engine errors.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Migration scripts could not be listed or created (M001).
    #[error("[M001] Migration discovery failed: {0}")]
    Discovery(#[source] CoreError),

    /// A migration's script could not be loaded (M002).
    #[error("[M002] Failed to load {direction} script for '{name}': {source}")]
    Load {
        name: String,
        direction: Direction,
        source: CoreError,
    },

    /// A migration's script had no statements (M003).
    #[error("[M003] Failed to parse {direction} script for '{name}': {source}")]
    Parse {
        name: String,
        direction: Direction,
        source: CoreError,
    },

    /// A statement or the enclosing transaction failed; nothing was kept (M004).
    #[error("[M004] Migration '{name}' ({direction}) failed and was rolled back: {source}")]
    Execution {
        name: String,
        direction: Direction,
        source: DbError,
    },

    /// Reading or writing the ledger table failed (M005).
    #[error("[M005] Ledger {operation} failed: {source}")]
    Ledger {
        operation: String,
        source: DbError,
    },

    /// The ledger references a name that is not a valid migration name (M006).
    #[error("[M006] Ledger entry '{name}' is not a valid migration name: {source}")]
    CorruptLedger { name: String, source: CoreError },

    /// Down was requested with an empty ledger (M007).
    #[error("[M007] No migrations have been applied")]
    NoMigrationsApplied,

    /// The ledger table could not be created (M008).
    #[error("[M008] Failed to set up ledger table '{table}': {source}")]
    SchemaSetup { table: String, source: DbError },

    /// Transaction control failed before a migration could be attributed (M009).
    #[error("[M009] Transaction failed: {0}")]
    Transaction(#[source] DbError),
}

/// Result type alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;

impl From<DbError> for MigrateError {
    fn from(err: DbError) -> Self {
        MigrateError::Transaction(err)
    }
}

impl MigrateError {
    /// Attach the migration being run to errors that lack it.
    pub(crate) fn in_migration(self, name: &str, direction: Direction) -> Self {
        match self {
            MigrateError::Transaction(source) => MigrateError::Execution {
                name: name.to_string(),
                direction,
                source,
            },
            other => other,
        }
    }
}
