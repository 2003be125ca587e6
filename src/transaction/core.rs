//! Defines the core data models and database queries for transactions.

use std::str::FromStr;

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, OwnerId, date_format};

/// Alias for the integer type used for transaction IDs.
pub type TransactionId = i64;

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned. Contributes positively to the balance.
    Income,
    /// Money spent. Contributes negatively to the balance.
    Expense,
}

impl TransactionKind {
    /// The name used for the kind in the database and in API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// Apply the sign of this kind to a non-negative `magnitude`.
    ///
    /// This is the only place where the sign of an amount is derived.
    pub fn signed(self, magnitude: f64) -> f64 {
        match self {
            TransactionKind::Income => magnitude,
            TransactionKind::Expense => -magnitude,
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(Error::Validation(
                "Type must be either \"income\" or \"expense\"".to_owned(),
            )),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|_| FromSqlError::InvalidType)
    }
}

/// An expense or income recorded by an owner.
///
/// `amount` is always a non-negative magnitude, the sign comes from `kind`.
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The owner who recorded the transaction.
    pub owner_id: OwnerId,
    /// The amount of money spent or earned in this transaction.
    pub amount: f64,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// A free text label such as "Salary" or "Food".
    pub category: String,
    /// An optional text description of what the transaction was for.
    pub description: Option<String>,
    /// The date the transaction is attributed to.
    #[serde(with = "date_format::date")]
    pub date: Date,
    /// When the record was created.
    #[serde(with = "date_format::timestamp")]
    pub created_at: OffsetDateTime,
    /// When the record was last modified.
    #[serde(with = "date_format::timestamp")]
    pub updated_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        amount: f64,
        kind: TransactionKind,
        category: &str,
        date: Date,
    ) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            kind,
            category: category.to_owned(),
            description: None,
            date,
        }
    }

    /// The amount with the sign implied by the transaction kind.
    pub fn signed_amount(&self) -> f64 {
        self.kind.signed(self.amount)
    }
}

/// A builder for creating [Transaction] instances.
///
/// The owner and the timestamps are set when the transaction is inserted with
/// [create_transaction].
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The non-negative amount of money.
    pub amount: f64,
    /// Whether the money was earned or spent.
    pub kind: TransactionKind,
    /// A free text label such as "Salary" or "Food".
    pub category: String,
    /// An optional text description.
    pub description: Option<String>,
    /// The date the transaction is attributed to.
    pub date: Date,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: Option<&str>) -> Self {
        self.description = description.map(str::to_owned);
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The comma separated column list matching [map_transaction_row].
pub(super) const TRANSACTION_COLUMNS: &str =
    "id, owner_id, amount, type, category, description, date, created_at, updated_at";

/// Create a new transaction owned by `owner_id` in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::Unauthorized] if `owner_id` does not refer to a registered owner,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    owner_id: OwnerId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let now = OffsetDateTime::now_utc();

    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" \
             (owner_id, amount, type, category, description, date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                owner_id.as_i64(),
                builder.amount,
                builder.kind,
                builder.category,
                builder.description,
                builder.date,
                now,
                now,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            // The session refers to an owner that is not in the database.
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                    ..
                },
                _,
            ) => Error::Unauthorized,
            error => error.into(),
        })?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
#[cfg(test)]
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Delete the transaction `id` if and only if it belongs to `owner_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if the transaction does not exist or
///   belongs to someone else,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    owner_id: OwnerId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND owner_id = ?2",
        (id, owner_id.as_i64()),
    )?;

    match rows_affected {
        0 => Err(Error::DeleteMissingTransaction),
        _ => Ok(()),
    }
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                category TEXT NOT NULL,
                description TEXT,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(owner_id) REFERENCES owner(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_owner_date ON \"transaction\"(owner_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// The row must contain the columns in the order of `TRANSACTION_COLUMNS`.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        owner_id: OwnerId::new(row.get(1)?),
        amount: row.get(2)?,
        kind: row.get(3)?,
        category: row.get(4)?,
        description: row.get(5)?,
        date: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, OwnerId, PasswordHash,
        db::initialize,
        owner::create_owner,
        transaction::{
            Transaction, TransactionKind, create_transaction, delete_transaction, get_transaction,
        },
    };

    fn get_test_connection() -> (Connection, OwnerId) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let owner = create_owner(
            "Test",
            "test@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();

        (conn, owner.id)
    }

    #[test]
    fn create_succeeds() {
        let (conn, owner_id) = get_test_connection();

        let transaction = create_transaction(
            owner_id,
            Transaction::build(12.3, TransactionKind::Expense, "Food", date!(2025 - 10 - 05))
                .description(Some("Lunch")),
            &conn,
        )
        .unwrap();

        assert_eq!(transaction.owner_id, owner_id);
        assert_eq!(transaction.amount, 12.3);
        assert_eq!(transaction.kind, TransactionKind::Expense);
        assert_eq!(transaction.category, "Food");
        assert_eq!(transaction.description.as_deref(), Some("Lunch"));
        assert_eq!(transaction.date, date!(2025 - 10 - 05));
        assert_eq!(transaction.created_at, transaction.updated_at);
    }

    #[test]
    fn create_fails_for_unknown_owner() {
        let (conn, _) = get_test_connection();

        let result = create_transaction(
            OwnerId::new(999),
            Transaction::build(1.0, TransactionKind::Income, "Gift", date!(2025 - 10 - 05)),
            &conn,
        );

        assert_eq!(result, Err(Error::Unauthorized));
    }

    #[test]
    fn table_rejects_negative_amount() {
        let (conn, owner_id) = get_test_connection();

        let result = create_transaction(
            owner_id,
            Transaction::build(-1.0, TransactionKind::Income, "Gift", date!(2025 - 10 - 05)),
            &conn,
        );

        assert!(matches!(result, Err(Error::SqlError(_))));
    }

    #[test]
    fn get_returns_created_transaction() {
        let (conn, owner_id) = get_test_connection();
        let created = create_transaction(
            owner_id,
            Transaction::build(5.0, TransactionKind::Income, "Gift", date!(2025 - 10 - 05)),
            &conn,
        )
        .unwrap();

        assert_eq!(get_transaction(created.id, &conn), Ok(created));
    }

    #[test]
    fn get_fails_on_invalid_id() {
        let (conn, _) = get_test_connection();

        assert_eq!(get_transaction(654, &conn), Err(Error::NotFound));
    }

    #[test]
    fn delete_removes_owned_transaction() {
        let (conn, owner_id) = get_test_connection();
        let created = create_transaction(
            owner_id,
            Transaction::build(5.0, TransactionKind::Income, "Gift", date!(2025 - 10 - 05)),
            &conn,
        )
        .unwrap();

        assert_eq!(delete_transaction(created.id, owner_id, &conn), Ok(()));
        assert_eq!(get_transaction(created.id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn delete_of_missing_and_foreign_transactions_fail_identically() {
        let (conn, owner_id) = get_test_connection();
        let other_owner = create_owner(
            "Other",
            "other@example.com",
            PasswordHash::new_unchecked("hunter3"),
            &conn,
        )
        .unwrap();
        let foreign = create_transaction(
            other_owner.id,
            Transaction::build(5.0, TransactionKind::Income, "Gift", date!(2025 - 10 - 05)),
            &conn,
        )
        .unwrap();

        let foreign_result = delete_transaction(foreign.id, owner_id, &conn);
        let missing_result = delete_transaction(foreign.id + 100, owner_id, &conn);

        assert_eq!(foreign_result, Err(Error::DeleteMissingTransaction));
        assert_eq!(foreign_result, missing_result);
        assert_eq!(get_transaction(foreign.id, &conn), Ok(foreign));
    }
}
