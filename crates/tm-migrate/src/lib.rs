//! tm-migrate - Migration engine for Tidemark
//!
//! Reconciles a [`tm_core::MigrationSource`] with the ledger table and runs
//! each pending migration's statements and ledger update in one
//! transaction.

pub mod error;
pub mod executor;
pub mod ledger;
pub mod migrator;

pub use error::{MigrateError, MigrateResult};
pub use executor::Executor;
pub use ledger::{AppliedSet, Ledger, LedgerEntry};
pub use migrator::{create, pending, MigrationState, MigrationStatus, Migrator, UpReport};
