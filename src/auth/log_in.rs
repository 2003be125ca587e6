//! Handles log-in requests and starts a session for the owner.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    auth::cookie::{invalidate_auth_cookie, set_auth_cookie},
    db::lock_connection,
    owner::get_owner_by_email,
};

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// Whether the auth cookie carries the `Secure` attribute.
    pub secure_cookies: bool,
    /// The database connection for looking up owners.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_duration: state.cookie_duration,
            secure_cookies: state.secure_cookies,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The credentials sent by the client to log in.
///
/// The password is a plain string, it is only compared against the stored hash.
#[derive(Clone, Deserialize)]
pub struct LogInData {
    /// The email the owner registered with.
    pub email: String,
    /// The password entered during log-in.
    pub password: String,
}

/// Handler for log-in requests via the POST method.
///
/// On success the auth cookie is set and the owner's profile is returned.
/// An unknown email and a wrong password produce the same error.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    payload: Result<Json<LogInData>, JsonRejection>,
) -> Response {
    let Ok(Json(credentials)) = payload else {
        return Error::Validation("Missing required fields".to_owned()).into_response();
    };

    let owner = match lock_connection(&state.db_connection)
        .and_then(|connection| get_owner_by_email(credentials.email.trim(), &connection))
    {
        Ok(owner) => owner,
        Err(Error::NotFound) => return Error::InvalidCredentials.into_response(),
        Err(error) => return error.into_response(),
    };

    match owner.password_hash.verify(&credentials.password) {
        Ok(true) => {}
        Ok(false) => return Error::InvalidCredentials.into_response(),
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return Error::HashingError(error.to_string()).into_response();
        }
    }

    match set_auth_cookie(
        jar.clone(),
        owner.id,
        state.cookie_duration,
        state.secure_cookies,
    ) {
        Ok(updated_jar) => {
            tracing::info!("Owner {} logged in", owner.id);
            (updated_jar, Json(owner.profile())).into_response()
        }
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            (invalidate_auth_cookie(jar, state.secure_cookies), error).into_response()
        }
    }
}
