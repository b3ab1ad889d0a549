//! Route handler for updating the user's list of watched coins.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, endpoints,
    user::{UserID, set_watchlist},
};

/// The state needed to update a watchlist.
#[derive(Clone)]
pub struct WatchlistState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for WatchlistState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The data submitted by the watchlist form.
#[derive(Deserialize)]
pub struct WatchlistForm {
    /// The watched symbols as free text, separated by whitespace or commas.
    pub symbols: String,
}

/// Replace the user's watchlist with the symbols from the form, then redirect
/// back to the home page.
///
/// Symbols are lowercased and deduplicated. An empty form clears the
/// watchlist.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn update_watchlist_endpoint(
    State(state): State<WatchlistState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<WatchlistForm>,
) -> Response {
    let mut symbols: Vec<String> = Vec::new();

    for symbol in form
        .symbols
        .split(|character: char| character.is_whitespace() || character == ',')
    {
        let symbol = symbol.trim().to_lowercase();

        if !symbol.is_empty() && !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }

    let result = set_watchlist(
        user_id,
        &symbols,
        &state
            .db_connection
            .lock()
            .expect("Could not acquire database lock"),
    );

    match result {
        Ok(()) => Redirect::to(endpoints::ROOT).into_response(),
        Err(error) => error.into_response(),
    }
}
