//! Database queries for listing an owner's transactions.

use std::ops::RangeInclusive;

use rusqlite::{Connection, params_from_iter, types::Value};
use time::Date;

use crate::{Error, OwnerId};

use super::core::{TRANSACTION_COLUMNS, Transaction, map_transaction_row};

/// Defines how transactions should be fetched from [query_transactions].
#[derive(Debug, Default, Clone)]
pub struct TransactionQuery {
    /// Include transactions within `date_range` (inclusive).
    pub date_range: Option<RangeInclusive<Date>>,
    /// Selects up to the first N (`limit`) transactions.
    pub limit: Option<u64>,
    /// Orders transactions by date in the order `sort_date`. None returns transactions in the
    /// order they are stored.
    pub sort_date: Option<SortOrder>,
}

/// The order to sort transactions in a [TransactionQuery].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}

/// Query the transactions owned by `owner_id`.
///
/// Transactions with the same date are ordered by ID in the same direction as
/// the dates, so the order is stable between calls.
///
/// # Errors
/// This function will return a [Error::SqlError] there is a SQL error.
pub fn query_transactions(
    owner_id: OwnerId,
    query: TransactionQuery,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut query_string_parts = vec![format!(
        "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE owner_id = ?1"
    )];
    let mut query_parameters = vec![Value::Integer(owner_id.as_i64())];

    if let Some(date_range) = query.date_range {
        query_string_parts.push(format!(
            "AND date BETWEEN ?{} AND ?{}",
            query_parameters.len() + 1,
            query_parameters.len() + 2,
        ));
        query_parameters.push(Value::Text(date_range.start().to_string()));
        query_parameters.push(Value::Text(date_range.end().to_string()));
    }

    match query.sort_date {
        Some(SortOrder::Ascending) => {
            query_string_parts.push("ORDER BY date ASC, id ASC".to_string())
        }
        Some(SortOrder::Descending) => {
            query_string_parts.push("ORDER BY date DESC, id DESC".to_string())
        }
        None => {}
    }

    if let Some(limit) = query.limit {
        query_string_parts.push(format!("LIMIT {limit}"));
    }

    let query_string = query_string_parts.join(" ");
    let params = params_from_iter(query_parameters.iter());

    connection
        .prepare(&query_string)?
        .query_map(params, map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
        .collect()
}
