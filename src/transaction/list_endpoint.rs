use axum::{
    Extension, Json,
    extract::{Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{Error, OwnerId, app_state::LedgerState, db::lock_connection};

use super::{
    form::parse_date,
    query::{SortOrder, TransactionQuery, query_transactions},
};

/// The query parameters accepted when listing transactions.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// The first date to include.
    pub start_date: Option<String>,
    /// The last date to include.
    pub end_date: Option<String>,
    /// The maximum number of transactions to return.
    pub limit: Option<u64>,
}

impl ListQuery {
    /// Convert the raw parameters into a [TransactionQuery], newest first.
    ///
    /// The date range is only applied when both bounds are given.
    fn into_transaction_query(self) -> Result<TransactionQuery, Error> {
        let date_range = match (self.start_date, self.end_date) {
            (Some(start_date), Some(end_date)) => {
                Some(parse_date(&start_date)?..=parse_date(&end_date)?)
            }
            _ => None,
        };

        Ok(TransactionQuery {
            date_range,
            limit: self.limit,
            sort_date: Some(SortOrder::Descending),
        })
    }
}

/// A route handler that lists the caller's transactions as JSON.
pub async fn list_transactions_endpoint(
    State(state): State<LedgerState>,
    Extension(owner_id): Extension<OwnerId>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response {
    let query = match query {
        Ok(Query(query)) => query.into_transaction_query(),
        Err(rejection) => {
            tracing::debug!("Rejected transaction list query: {rejection}");
            Err(Error::Validation("Invalid query parameters".to_owned()))
        }
    };

    let result = query.and_then(|query| {
        let connection = lock_connection(&state.db_connection)?;
        query_transactions(owner_id, query, &connection)
    });

    match result {
        Ok(transactions) => Json(transactions).into_response(),
        Err(error) => error.into_response(),
    }
}
