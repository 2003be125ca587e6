use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, OwnerId,
    db::{check_connection, lock_connection},
};

use super::{
    core::create_transaction,
    form::{AmountPolicy, TransactionForm},
};

/// The state needed for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Which amounts are accepted.
    pub amount_policy: AmountPolicy,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            amount_policy: state.amount_policy,
        }
    }
}

/// A route handler for creating a new transaction owned by the caller.
///
/// Responds with the created transaction as JSON.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(owner_id): Extension<OwnerId>,
    payload: Result<Json<TransactionForm>, JsonRejection>,
) -> Response {
    let Json(form) = match payload {
        Ok(form) => form,
        Err(rejection) => {
            tracing::debug!("Rejected transaction payload: {rejection}");
            return Error::Validation("Invalid request body".to_owned()).into_response();
        }
    };

    let builder = match form.into_builder(state.amount_policy) {
        Ok(builder) => builder,
        Err(error) => return error.into_response(),
    };

    let result = lock_connection(&state.db_connection).and_then(|connection| {
        check_connection(&connection)?;
        create_transaction(owner_id, builder, &connection)
    });

    match result {
        Ok(transaction) => {
            tracing::info!(
                "Owner {owner_id} created transaction {}",
                transaction.id
            );
            Json(transaction).into_response()
        }
        Err(error) => error.into_response(),
    }
}
