//! Defines the endpoint for placing a new order.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of rejecting the request like axum::Form.
use axum_extra::extract::Form;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{AppState, Error, endpoints, user::UserID};

use super::core::{NewOrder, create_order};

/// The state needed to place an order.
#[derive(Debug, Clone)]
pub struct CreateOrderState {
    /// The database connection for managing orders.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateOrderState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for placing an order.
#[derive(Debug, Deserialize)]
pub struct OrderForm {
    /// The ticker symbol of the purchased asset.
    pub symbol: String,
    /// The unit price the asset was bought at.
    pub bought_at: f64,
    /// The quantity of the asset bought.
    pub amount: f64,
}

/// A route handler for placing a new order.
///
/// The owner is stamped from the authenticated session, never from the form.
/// Redirects to the home page on success, and back to the home page (which
/// hosts the form) when the submitted symbol is empty.
pub async fn create_order_endpoint(
    State(state): State<CreateOrderState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<OrderForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let new_order = NewOrder {
        symbol: form.symbol,
        bought_at: form.bought_at,
        amount: form.amount,
        user_id,
    };

    match create_order(new_order, &connection) {
        Ok(_) => Redirect::to(endpoints::ROOT).into_response(),
        Err(Error::EmptySymbol) => {
            tracing::warn!("user {user_id} submitted an order without a symbol");
            Redirect::to(endpoints::ROOT).into_response()
        }
        Err(error) => {
            tracing::error!("could not create order: {error}");
            error.into_response()
        }
    }
}
