#![allow(missing_docs)]

use axum::http::StatusCode;
use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::json;
use time::{Date, OffsetDateTime};

use crate::{
    AmountPolicy, AppState, OwnerId, OwnerProfile, Transaction, TransactionKind,
    auth::COOKIE_TOKEN, build_router, endpoints,
};

pub(crate) const TEST_PASSWORD: &str = "averysafeandsecurepassword";

/// The lowest cost bcrypt accepts, so that tests do not spend their time hashing.
const TEST_PASSWORD_COST: u32 = 4;

pub(crate) fn get_test_state(amount_policy: AmountPolicy) -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not create in-memory SQLite database");

    AppState::new(connection, "42", "Etc/UTC", amount_policy)
        .expect("Could not create app state")
        .with_password_cost(TEST_PASSWORD_COST)
}

pub(crate) fn get_test_server() -> TestServer {
    get_test_server_with_policy(AmountPolicy::default())
}

pub(crate) fn get_test_server_with_policy(amount_policy: AmountPolicy) -> TestServer {
    get_test_server_with_state(get_test_state(amount_policy))
}

pub(crate) fn get_test_server_with_state(state: AppState) -> TestServer {
    TestServer::new(build_router(state))
}

/// Move the transaction table out of the way so that the store's
/// connectivity check fails while the owner table stays readable.
pub(crate) fn hide_transaction_table(state: &AppState) -> &'static str {
    const HIDDEN_TABLE: &str = "hidden_transaction";

    state
        .db_connection
        .lock()
        .unwrap()
        .execute(&format!(r#"ALTER TABLE "transaction" RENAME TO {HIDDEN_TABLE}"#), [])
        .unwrap();

    HIDDEN_TABLE
}

/// Log in with [TEST_PASSWORD] and return the session cookie.
pub(crate) async fn log_in(server: &TestServer, email: &str) -> Cookie<'static> {
    let response = server
        .post(endpoints::LOG_IN)
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .await;
    response.assert_status_ok();

    response.cookie(COOKIE_TOKEN)
}

/// Sign up an owner with `email` and [TEST_PASSWORD], then log them in.
pub(crate) async fn sign_up_and_log_in(
    server: &TestServer,
    email: &str,
) -> (OwnerProfile, Cookie<'static>) {
    let response = server
        .post(endpoints::SIGN_UP)
        .json(&json!({ "name": "Test Owner", "email": email, "password": TEST_PASSWORD }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let owner = response.json::<OwnerProfile>();

    (owner, log_in(server, email).await)
}

/// An unsaved transaction for exercising the pure calculations.
pub(crate) fn transaction_on(
    amount: f64,
    kind: TransactionKind,
    category: &str,
    date: Date,
) -> Transaction {
    let now = OffsetDateTime::now_utc();

    Transaction {
        id: 0,
        owner_id: OwnerId::new(1),
        amount,
        kind,
        category: category.to_owned(),
        description: None,
        date,
        created_at: now,
        updated_at: now,
    }
}
