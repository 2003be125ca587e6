use axum::{
    Extension, Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    OwnerId,
    app_state::LedgerState,
    db::lock_connection,
    transaction::{SortOrder, TransactionQuery, query_transactions},
};

use super::core::calculate_balance;

/// A route handler that responds with the caller's current balance.
///
/// The balance is folded from every transaction the caller owns, oldest first,
/// in the same order the report summary uses.
pub async fn get_balance_endpoint(
    State(state): State<LedgerState>,
    Extension(owner_id): Extension<OwnerId>,
) -> Response {
    let query = TransactionQuery {
        sort_date: Some(SortOrder::Ascending),
        ..Default::default()
    };

    let transactions = match lock_connection(&state.db_connection)
        .and_then(|connection| query_transactions(owner_id, query, &connection))
    {
        Ok(transactions) => transactions,
        Err(error) => return error.into_response(),
    };

    let balance = calculate_balance(&transactions);

    Json(json!({ "balance": balance })).into_response()
}
