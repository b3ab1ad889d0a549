//! Crypteasy is a small web app for recording cryptocurrency purchases and
//! keeping an eye on live market prices for a personal watch-list.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::response::{IntoResponse, Redirect, Response};
use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
mod db;
mod endpoints;
mod home;
mod html;
mod internal_server_error;
mod log_in;
mod log_out;
mod logging;
mod navigation;
mod not_found;
mod order;
mod password;
mod prices;
mod register;
mod routing;
mod user;
mod watchlist;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use password::{PasswordHash, ValidatedPassword};
pub use prices::{DEFAULT_PRICE_API_URL, PriceClient};
pub use routing::build_router;
pub use user::{User, UserID};

use crate::{
    internal_server_error::get_internal_server_error_response,
    not_found::get_404_not_found_response,
};

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
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided a username/password pair that does not match a
    /// registered user, or presented an auth cookie that could not be used.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The session cookie is missing from the cookie jar in the request.
    #[error("no session cookie in the cookie jar")]
    CookieMissing,

    /// The session token could not be serialized into or deserialized from
    /// the auth cookie.
    #[error("could not serialize the session token: {0}")]
    TokenSerialization(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email used for registration already belongs to a registered user.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// The username used for registration is already taken.
    #[error("the username is already taken")]
    DuplicateUsername,

    /// An order was submitted without a ticker symbol.
    #[error("an order must have a ticker symbol")]
    EmptySymbol,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The authenticated user does not own the resource they tried to mutate.
    ///
    /// The response is a redirect to the home route and no mutation is
    /// performed.
    #[error("the resource belongs to another user")]
    NotAuthorized,

    /// A value could not be serialized as JSON.
    #[error("could not serialize as JSON: {0}")]
    JsonSerialization(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The outbound call to the market price API failed.
    ///
    /// Pages should degrade gracefully: log the error and render without
    /// price data.
    #[error("the price API request failed: {0}")]
    PriceApi(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.username") =>
            {
                Error::DuplicateUsername
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::NotAuthorized => Redirect::to(endpoints::ROOT).into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                get_internal_server_error_response()
            }
        }
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;

    use crate::{Error, endpoints};

    fn unique_violation(connection: &Connection) -> rusqlite::Error {
        connection
            .execute(
                "INSERT INTO user (id, email, username, password, watchlist)
                 VALUES (1, 'a@example.com', 'a', 'hash', '[]')",
                (),
            )
            .unwrap();

        connection
            .execute(
                "INSERT INTO user (id, email, username, password, watchlist)
                 VALUES (2, 'a@example.com', 'b', 'hash', '[]')",
                (),
            )
            .unwrap_err()
    }

    #[test]
    fn duplicate_email_maps_to_duplicate_email_error() {
        let connection = Connection::open_in_memory().unwrap();
        crate::initialize_db(&connection).unwrap();

        let error: Error = unique_violation(&connection).into();

        assert_eq!(error, Error::DuplicateEmail);
    }

    #[test]
    fn missing_row_maps_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
    }

    #[test]
    fn not_authorized_redirects_home() {
        let response = Error::NotAuthorized.into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), endpoints::ROOT);
    }

    #[test]
    fn not_found_renders_404_page() {
        let response = Error::NotFound.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
