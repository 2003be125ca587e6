use axum::{
    Extension, Json,
    extract::{Path, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{Error, OwnerId, app_state::LedgerState, db::lock_connection};

use super::core::{TransactionId, delete_transaction};

/// A route handler for deleting one of the caller's transactions.
///
/// Transactions that do not exist and transactions owned by someone else
/// produce the same 404 response.
pub async fn delete_transaction_endpoint(
    State(state): State<LedgerState>,
    Extension(owner_id): Extension<OwnerId>,
    transaction_id: Result<Path<TransactionId>, PathRejection>,
) -> Response {
    let Ok(Path(transaction_id)) = transaction_id else {
        return Error::DeleteMissingTransaction.into_response();
    };

    let result = lock_connection(&state.db_connection)
        .and_then(|connection| delete_transaction(transaction_id, owner_id, &connection));

    match result {
        Ok(()) => {
            tracing::info!("Owner {owner_id} deleted transaction {transaction_id}");
            Json(json!({ "message": "Transaction deleted successfully" })).into_response()
        }
        Err(Error::DeleteMissingTransaction) => {
            tracing::debug!(
                "Owner {owner_id} could not delete transaction {transaction_id}: not found or not owned"
            );
            Error::DeleteMissingTransaction.into_response()
        }
        Err(error) => error.into_response(),
    }
}
