//! Fintrack is a web service for tracking personal income and expenses.
//!
//! Owners sign up, log in, record income and expense transactions, and read
//! back their balance and aggregate reports. The balance and the reports are
//! never stored: they are recomputed from the owner's transactions on every
//! request.
//!
//! This library provides a JSON REST API backed by SQLite.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod balance;
mod date_format;
mod db;
pub mod endpoints;
mod logging;
mod owner;
mod password;
mod provisioning;
mod report;
mod routing;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, create_cookie_key};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, MAX_REQUEST_BODY_SIZE, logging_middleware};
pub use owner::{Owner, OwnerId, OwnerProfile};
pub use password::PasswordHash;
pub use routing::build_router;
pub use timezone::get_local_offset;
pub use transaction::{AmountPolicy, Transaction, TransactionKind};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
///
/// Every variant maps to a fixed HTTP status code and a short message in the
/// JSON body `{"error": "..."}`. Details that could leak internals, such as
/// SQL errors, are logged on the server and never sent to the client.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The client sent malformed input or left out a required field.
    ///
    /// The message is shown to the client, so it must only describe the
    /// client's input.
    #[error("{0}")]
    Validation(String),

    /// The request did not carry a valid session.
    #[error("no valid session for the request")]
    Unauthorized,

    /// The email and password did not match a registered owner.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The email used to sign up is already registered.
    #[error("the email is already in use")]
    DuplicateEmail,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete a transaction that does not exist or that belongs to
    /// another owner. Both cases produce the same response.
    #[error("tried to delete a transaction that is not in the database or not owned by the caller")]
    DeleteMissingTransaction,

    /// The request body is larger than the server is willing to buffer.
    #[error("the request body exceeds {0} bytes")]
    RequestBodyTooLarge(usize),

    /// The route exists but does not accept the request method.
    #[error("the method is not allowed for the route")]
    MethodNotAllowed,

    /// The connectivity check against the database failed before a write.
    #[error("the database is not reachable")]
    StoreUnavailable,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An error occurred while serializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && desc.ends_with("owner.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_and_message(&self) -> (StatusCode, &str) {
        match self {
            Error::Validation(message) => (StatusCode::BAD_REQUEST, message),
            Error::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            Error::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid email or password"),
            Error::DuplicateEmail => (StatusCode::BAD_REQUEST, "Email already in use"),
            Error::NotFound => (StatusCode::NOT_FOUND, "Not found"),
            Error::RequestBodyTooLarge(_) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
            }
            Error::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                "Transaction not found or not authorized",
            ),
            Error::StoreUnavailable => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Database connection error")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use serde_json::Value;

    use crate::Error;

    async fn into_status_and_body(error: Error) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn validation_error_shows_message() {
        let (status, body) =
            into_status_and_body(Error::Validation("Missing required fields".to_owned())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");
    }

    #[tokio::test]
    async fn sql_error_hides_details() {
        let (status, body) = into_status_and_body(Error::SqlError(
            rusqlite::Error::InvalidColumnName("secret_column".to_owned()),
        ))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert!(!body.to_string().contains("secret_column"));
    }

    #[tokio::test]
    async fn store_unavailable_has_dedicated_message() {
        let (status, body) = into_status_and_body(Error::StoreUnavailable).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Database connection error");
    }

    #[tokio::test]
    async fn unauthorized_maps_to_401() {
        let (status, body) = into_status_and_body(Error::Unauthorized).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }
}
