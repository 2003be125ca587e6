//! Creates the database schema and provides helpers for accessing the shared connection.

use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{Error, owner::create_owner_table, transaction::create_transaction_table};

/// Create the tables for the domain models if they do not already exist.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    // Foreign keys are off by default in SQLite and cannot be toggled inside a transaction.
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_owner_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()
}

/// Check that the database answers a query against both ledger tables.
///
/// Mutating handlers call this before writing so that an unreachable database
/// is reported separately from a failed write.
///
/// # Errors
/// Returns [Error::StoreUnavailable] if the query fails, e.g. because the
/// database file is gone or a table is missing.
pub fn check_connection(connection: &Connection) -> Result<(), Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM owner), EXISTS(SELECT 1 FROM \"transaction\")",
            [],
            |row| row.get::<_, bool>(0),
        )
        .map(|_| ())
        .map_err(|error| {
            tracing::error!("Database connection check failed: {error}");
            Error::StoreUnavailable
        })
}

/// Acquire the lock on the shared database connection.
///
/// # Errors
/// Returns [Error::DatabaseLockError] if the lock is poisoned.
pub fn lock_connection(connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, Error> {
    connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}
