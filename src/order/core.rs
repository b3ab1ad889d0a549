//! Defines the order model and its database queries.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{Error, user::UserID};

/// Alias for the integer type used for order row IDs.
pub type OrderId = i64;

/// A recorded purchase of a crypto asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    /// The ID of the order.
    pub id: OrderId,
    /// The lowercase ticker symbol of the purchased asset, e.g. "btc".
    pub symbol: String,
    /// The unit price the asset was bought at.
    pub bought_at: f64,
    /// The quantity of the asset bought.
    pub amount: f64,
    /// When the order was recorded. Assigned by the server at creation time.
    pub created_at: OffsetDateTime,
    /// The ID of the user that placed the order.
    pub user_id: UserID,
}

impl Order {
    /// Whether the user with `user_id` owns this order.
    ///
    /// Mutations must be gated on this check: an order is only visible and
    /// mutable through its owner's session.
    pub fn is_owned_by(&self, user_id: UserID) -> bool {
        self.user_id == user_id
    }
}

/// The fields needed to place an order.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    /// The ticker symbol of the purchased asset.
    pub symbol: String,
    /// The unit price the asset was bought at.
    pub bought_at: f64,
    /// The quantity of the asset bought.
    pub amount: f64,
    /// The ID of the user placing the order.
    pub user_id: UserID,
}

/// Create the order table in the database.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_order_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"order\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL,
                bought_at REAL NOT NULL,
                amount REAL NOT NULL,
                created_at TEXT NOT NULL,
                user_id INTEGER NOT NULL REFERENCES user(id)
                )",
        (),
    )?;

    Ok(())
}

/// Create a new order in the database.
///
/// The symbol is trimmed and lowercased, and the creation timestamp is
/// assigned by the server.
///
/// # Errors
///
/// This function will return a:
/// - [Error::EmptySymbol] if the symbol is empty after trimming,
/// - [Error::NotFound] if `user_id` does not refer to a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_order(new_order: NewOrder, connection: &Connection) -> Result<Order, Error> {
    let symbol = new_order.symbol.trim().to_lowercase();

    if symbol.is_empty() {
        return Err(Error::EmptySymbol);
    }

    let created_at = OffsetDateTime::now_utc();

    let order = connection
        .prepare(
            "INSERT INTO \"order\" (symbol, bought_at, amount, created_at, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, symbol, bought_at, amount, created_at, user_id",
        )?
        .query_row(
            (
                &symbol,
                new_order.bought_at,
                new_order.amount,
                created_at,
                new_order.user_id.as_i64(),
            ),
            map_order_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::NotFound,
            error => error.into(),
        })?;

    Ok(order)
}

/// Retrieve an order from the database by its `id`.
///
/// # Errors
///
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid order,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_order(id: OrderId, connection: &Connection) -> Result<Order, Error> {
    connection
        .prepare(
            "SELECT id, symbol, bought_at, amount, created_at, user_id
             FROM \"order\" WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_order_row)
        .map_err(|error| error.into())
}

/// Retrieve all orders owned by the user with `user_id`, most recent first.
///
/// # Errors
///
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_orders_by_user(user_id: UserID, connection: &Connection) -> Result<Vec<Order>, Error> {
    connection
        .prepare(
            "SELECT id, symbol, bought_at, amount, created_at, user_id
             FROM \"order\" WHERE user_id = :user_id
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_order_row)?
        .collect::<Result<Vec<Order>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

type RowsAffected = usize;

/// Delete the order with `id` from the database.
///
/// Returns the number of rows deleted, which is zero when `id` does not refer
/// to an order. The caller is responsible for the ownership check, see
/// [Order::is_owned_by].
///
/// # Errors
///
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn delete_order(id: OrderId, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM \"order\" WHERE id = :id", &[(":id", &id)])
        .map_err(|error| error.into())
}

/// Get the total number of orders in the database.
#[cfg(test)]
pub(crate) fn count_orders(connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"order\";", [], |row| row.get(0))
        .map_err(|error| error.into())
}

fn map_order_row(row: &Row) -> rusqlite::Result<Order> {
    Ok(Order {
        id: row.get(0)?,
        symbol: row.get(1)?,
        bought_at: row.get(2)?,
        amount: row.get(3)?,
        created_at: row.get(4)?,
        user_id: UserID::new(row.get(5)?),
    })
}
