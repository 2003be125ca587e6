//! Handles sign-up requests by provisioning a new account.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, OwnerProfile, PasswordHash,
    db::{check_connection, lock_connection},
    owner::get_owner_by_email,
    provisioning::provision_account,
    timezone::local_today,
};

/// The state needed to sign up a new owner.
#[derive(Debug, Clone)]
pub struct SignUpState {
    /// The database connection for creating owners.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The bcrypt cost for hashing the password.
    pub password_cost: u32,
}

impl FromRef<AppState> for SignUpState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            password_cost: state.password_cost,
        }
    }
}

/// The data sent by the client to sign up.
#[derive(Debug, Default, Deserialize)]
pub struct SignUpData {
    /// The name shown for the owner.
    pub name: Option<String>,
    /// The email used to log in.
    pub email: Option<String>,
    /// The plain text password, only kept long enough to hash it.
    pub password: Option<String>,
}

impl SignUpData {
    /// The trimmed name and email and the password, if none of them are empty.
    fn required_fields(&self) -> Option<(&str, &str, &str)> {
        let name = self.name.as_deref().map(str::trim)?;
        let email = self.email.as_deref().map(str::trim)?;
        let password = self.password.as_deref()?;

        if name.is_empty() || email.is_empty() || password.is_empty() {
            return None;
        }

        Some((name, email, password))
    }
}

/// A route handler for creating a new owner with a seed transaction.
///
/// Responds with 201 Created and the owner's profile.
pub async fn post_sign_up(
    State(state): State<SignUpState>,
    payload: Result<Json<SignUpData>, JsonRejection>,
) -> Response {
    let Json(data) = match payload {
        Ok(data) => data,
        Err(rejection) => {
            tracing::debug!("Rejected sign up payload: {rejection}");
            return Error::Validation("Invalid request body".to_owned()).into_response();
        }
    };

    let Some((name, email, password)) = data.required_fields() else {
        return Error::Validation("Missing required fields".to_owned()).into_response();
    };

    match sign_up(&state, name, email, password) {
        Ok(profile) => {
            tracing::info!("Signed up owner {}", profile.id);
            (StatusCode::CREATED, Json(profile)).into_response()
        }
        Err(error) => error.into_response(),
    }
}

fn sign_up(
    state: &SignUpState,
    name: &str,
    email: &str,
    password: &str,
) -> Result<OwnerProfile, Error> {
    {
        let connection = lock_connection(&state.db_connection)?;
        check_connection(&connection)?;

        match get_owner_by_email(email, &connection) {
            Ok(_) => return Err(Error::DuplicateEmail),
            Err(Error::NotFound) => {}
            Err(error) => return Err(error),
        }
    }

    // The connection is released while hashing.
    let password_hash = PasswordHash::new(password, state.password_cost)?;
    let today = local_today(&state.local_timezone)?;

    let connection = lock_connection(&state.db_connection)?;
    let owner = provision_account(name, email, password_hash, today, &connection)?;

    Ok(owner.profile())
}
