//! Code for creating the owner table and fetching owners from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, PasswordHash};

/// A newtype wrapper for integer owner IDs.
///
/// This helps disambiguate owner IDs from transaction IDs, leading to better compile time
/// errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct OwnerId(i64);

impl OwnerId {
    /// Create a new owner ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the owner ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered owner of transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct Owner {
    /// The owner's ID in the application database.
    pub id: OwnerId,
    /// The name shown for the owner.
    pub name: String,
    /// The owner's email, unique across all owners.
    pub email: String,
    /// The owner's password hash.
    pub password_hash: PasswordHash,
}

impl Owner {
    /// The attributes of the owner that may be sent to clients.
    pub fn profile(&self) -> OwnerProfile {
        OwnerProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// The public attributes of an [Owner]. Never contains credential material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerProfile {
    /// The owner's ID in the application database.
    pub id: OwnerId,
    /// The name shown for the owner.
    pub name: String,
    /// The owner's email.
    pub email: String,
}

/// Create the owner table.
///
/// Emails are compared exactly, so "Foo@bar.baz" and "foo@bar.baz" are two
/// different owners.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_owner_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS owner (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new owner into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if `email` is already registered,
/// - [Error::SqlError] if some other SQL related error occurred.
pub fn create_owner(
    name: &str,
    email: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<Owner, Error> {
    connection.execute(
        "INSERT INTO owner (name, email, password) VALUES (?1, ?2, ?3)",
        (name, email, password_hash.as_ref()),
    )?;

    let id = OwnerId::new(connection.last_insert_rowid());

    Ok(Owner {
        id,
        name: name.to_owned(),
        email: email.to_owned(),
        password_hash,
    })
}

/// Get the owner from the database with an ID equal to `owner_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `owner_id` does not belong to a registered owner.
/// - there was an error trying to access the store.
#[cfg(test)]
pub fn get_owner_by_id(owner_id: OwnerId, connection: &Connection) -> Result<Owner, Error> {
    connection
        .prepare("SELECT id, name, email, password FROM owner WHERE id = :id")?
        .query_row(&[(":id", &owner_id.as_i64())], map_owner_row)
        .map_err(|error| error.into())
}

/// Get the owner registered with exactly `email`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no owner has the email, or [Error::SqlError]
/// if there are SQL related errors.
pub fn get_owner_by_email(email: &str, connection: &Connection) -> Result<Owner, Error> {
    connection
        .prepare("SELECT id, name, email, password FROM owner WHERE email = :email")?
        .query_row(&[(":email", &email)], map_owner_row)
        .map_err(|error| error.into())
}

/// Get the number of owners in the database.
#[cfg(test)]
pub fn count_owners(connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM owner;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

fn map_owner_row(row: &Row) -> Result<Owner, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let name = row.get(1)?;
    let email = row.get(2)?;
    let raw_password_hash: String = row.get(3)?;

    Ok(Owner {
        id: OwnerId::new(raw_id),
        name,
        email,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}
