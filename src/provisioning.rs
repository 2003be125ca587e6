//! Creates a new owner together with their seed transaction.

use rusqlite::Connection;
use time::Date;

use crate::{
    Error, Owner, PasswordHash,
    owner::create_owner,
    transaction::{Transaction, TransactionKind, create_transaction},
};

/// The category of the transaction every new owner starts with.
pub const INITIAL_BALANCE_CATEGORY: &str = "Initial Balance";

/// The description of the transaction every new owner starts with.
pub const INITIAL_BALANCE_DESCRIPTION: &str = "Initial account balance";

/// Create an owner and their zero "Initial Balance" income dated `today`.
///
/// Both rows are written in one database transaction. If either insert fails
/// the transaction is rolled back and nothing is persisted.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if `email` is already registered,
/// - [Error::SqlError] if any other SQL error occurred.
pub fn provision_account(
    name: &str,
    email: &str,
    password_hash: PasswordHash,
    today: Date,
    connection: &Connection,
) -> Result<Owner, Error> {
    let transaction = connection.unchecked_transaction()?;

    let owner = create_owner(name, email, password_hash, &transaction)?;
    create_transaction(
        owner.id,
        Transaction::build(0.0, TransactionKind::Income, INITIAL_BALANCE_CATEGORY, today)
            .description(Some(INITIAL_BALANCE_DESCRIPTION)),
        &transaction,
    )?;

    transaction.commit()?;

    Ok(owner)
}
