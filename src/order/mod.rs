//! Order management: recorded cryptocurrency purchases.
//!
//! This module contains everything related to orders:
//! - The `Order` model and its database queries
//! - The endpoint for placing an order
//! - The ownership-gated endpoint for deleting an order

mod core;
mod create_endpoint;
mod delete_endpoint;

pub use core::{Order, create_order_table, get_orders_by_user};
pub use create_endpoint::create_order_endpoint;
pub use delete_endpoint::delete_order_endpoint;

#[cfg(test)]
pub(crate) use core::{NewOrder, count_orders, create_order, get_order};
