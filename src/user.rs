//! The user model, the user table DDL, and user queries.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, password::PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The ticker symbols every new account starts watching.
pub const DEFAULT_WATCHLIST: &[&str] = &[
    "btc", "eth", "sol", "ada", "dot", "doge", "ltc", "xrp", "bnb", "link", "uni", "bch", "trx",
    "vet", "enj", "eos", "shib",
];

/// A user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's email address, unique across all users.
    pub email: String,
    /// The name the user logs in with, unique across all users.
    pub username: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// The ticker symbols the user wants market prices for, in display order.
    pub watchlist: Vec<String>,
}

/// The fields needed to register a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// The user's email address.
    pub email: String,
    /// The name the user logs in with.
    pub username: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                watchlist TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// New users start with the [DEFAULT_WATCHLIST].
///
/// # Errors
///
/// Returns [Error::DuplicateEmail] or [Error::DuplicateUsername] if the email
/// or username is already registered, or [Error::SqlError] if any other SQL
/// related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    let watchlist: Vec<String> = DEFAULT_WATCHLIST.iter().map(|s| s.to_string()).collect();
    let watchlist_json =
        serde_json::to_string(&watchlist).map_err(|e| Error::JsonSerialization(e.to_string()))?;

    connection.execute(
        "INSERT INTO user (email, username, password, watchlist) VALUES (?1, ?2, ?3, ?4)",
        (
            &new_user.email,
            &new_user.username,
            new_user.password_hash.to_string(),
            &watchlist_json,
        ),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        email: new_user.email,
        username: new_user.username,
        password_hash: new_user.password_hash,
        watchlist,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, email, username, password, watchlist FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user from the database whose username equals `username`.
///
/// # Errors
///
/// This function will return an error if:
/// - `username` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_username(username: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, email, username, password, watchlist FROM user WHERE username = :username")?
        .query_row(&[(":username", &username)], map_user_row)
        .map_err(|error| error.into())
}

/// Replace the watch-list of the user with an ID equal to `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not belong to a registered
/// user, or [Error::SqlError] if an SQL related error occurred.
pub fn set_watchlist(
    user_id: UserID,
    symbols: &[String],
    connection: &Connection,
) -> Result<(), Error> {
    let watchlist_json =
        serde_json::to_string(symbols).map_err(|e| Error::JsonSerialization(e.to_string()))?;

    let rows_affected = connection.execute(
        "UPDATE user SET watchlist = ?1 WHERE id = ?2",
        (&watchlist_json, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Get the number of users in the database.
#[cfg(test)]
pub(crate) fn count_users(connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

fn map_user_row(row: &Row) -> rusqlite::Result<User> {
    let raw_watchlist: String = row.get(4)?;
    let watchlist = serde_json::from_str(&raw_watchlist).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        email: row.get(1)?,
        username: row.get(2)?,
        password_hash: PasswordHash::new_unchecked(&row.get::<_, String>(3)?),
        watchlist,
    })
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{
        Error, PasswordHash, initialize_db,
        user::{
            DEFAULT_WATCHLIST, NewUser, UserID, count_users, create_user, get_user_by_id,
            get_user_by_username, set_watchlist,
        },
    };

    fn get_db_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        initialize_db(&connection).expect("Could not initialize database");

        connection
    }

    fn test_user(email: &str, username: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            username: username.to_string(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        }
    }

    #[test]
    fn insert_user_succeeds_with_default_watchlist() {
        let connection = get_db_connection();

        let inserted_user = create_user(test_user("ada@example.com", "ada"), &connection).unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.email, "ada@example.com");
        assert_eq!(inserted_user.username, "ada");
        assert_eq!(inserted_user.watchlist, DEFAULT_WATCHLIST);
    }

    #[test]
    fn insert_user_fails_with_duplicate_email() {
        let connection = get_db_connection();
        create_user(test_user("ada@example.com", "ada"), &connection).unwrap();

        let result = create_user(test_user("ada@example.com", "grace"), &connection);

        assert_eq!(result, Err(Error::DuplicateEmail));
        // The failed registration must not mutate the user table.
        assert_eq!(count_users(&connection).unwrap(), 1);
    }

    #[test]
    fn insert_user_fails_with_duplicate_username() {
        let connection = get_db_connection();
        create_user(test_user("ada@example.com", "ada"), &connection).unwrap();

        let result = create_user(test_user("grace@example.com", "ada"), &connection);

        assert_eq!(result, Err(Error::DuplicateUsername));
        assert_eq!(count_users(&connection).unwrap(), 1);
    }

    #[test]
    fn get_user_fails_with_non_existent_id() {
        let connection = get_db_connection();

        let result = get_user_by_id(UserID::new(42), &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_user_by_username_round_trip() {
        let connection = get_db_connection();
        let inserted_user = create_user(test_user("ada@example.com", "ada"), &connection).unwrap();

        let retrieved_user = get_user_by_username("ada", &connection).unwrap();

        assert_eq!(retrieved_user, inserted_user);
    }

    #[test]
    fn get_user_by_username_fails_with_unknown_name() {
        let connection = get_db_connection();

        let result = get_user_by_username("nobody", &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn set_watchlist_replaces_symbols() {
        let connection = get_db_connection();
        let user = create_user(test_user("ada@example.com", "ada"), &connection).unwrap();
        let symbols = vec!["btc".to_string(), "xmr".to_string()];

        set_watchlist(user.id, &symbols, &connection).unwrap();

        let retrieved_user = get_user_by_id(user.id, &connection).unwrap();
        assert_eq!(retrieved_user.watchlist, symbols);
    }

    #[test]
    fn set_watchlist_fails_for_unknown_user() {
        let connection = get_db_connection();

        let result = set_watchlist(UserID::new(42), &["btc".to_string()], &connection);

        assert_eq!(result, Err(Error::NotFound));
    }
}
