//! Defines the ownership-gated endpoint for deleting an order.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{alert_error, render},
    user::UserID,
};

use super::core::{OrderId, delete_order, get_order};

/// The state needed to delete an order.
#[derive(Debug, Clone)]
pub struct DeleteOrderState {
    /// The database connection for managing orders.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteOrderState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting an order.
///
/// The order must exist and be owned by the authenticated user. A lookup miss
/// responds with a 404 alert without raising on the missing row, and an
/// ownership mismatch redirects home without deleting anything.
pub async fn delete_order_endpoint(
    State(state): State<DeleteOrderState>,
    Extension(user_id): Extension<UserID>,
    Path(order_id): Path<OrderId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let order = match get_order(order_id, &connection) {
        Ok(order) => order,
        Err(Error::NotFound) => {
            return render(
                StatusCode::NOT_FOUND,
                alert_error(
                    "Could not delete order",
                    "The order could not be found. Try refreshing the page to \
                    see if the order has already been deleted.",
                ),
            );
        }
        Err(error) => {
            tracing::error!("could not look up order {order_id}: {error}");
            return error.into_response();
        }
    };

    if !order.is_owned_by(user_id) {
        tracing::warn!(
            "user {user_id} tried to delete order {order_id} owned by user {}",
            order.user_id
        );
        return (
            HxRedirect(endpoints::ROOT.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response();
    }

    if let Err(error) = delete_order(order_id, &connection) {
        tracing::error!("could not delete order {order_id}: {error}");
        return error.into_response();
    }

    (
        HxRedirect(endpoints::ROOT.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
