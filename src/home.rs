//! Defines the route handler for the home page, which shows market prices for
//! the user's watched coins and their recorded orders.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::macros::format_description;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, render,
    },
    navigation::NavBar,
    order::{Order, get_orders_by_user},
    prices::{PriceClient, Quote},
    user::{UserID, get_user_by_id},
};

/// The state needed for the home page.
#[derive(Clone)]
pub struct HomePageState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The client used to fetch market prices.
    pub price_client: PriceClient,
}

impl FromRef<AppState> for HomePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            price_client: state.price_client.clone(),
        }
    }
}

/// Render the home page for the logged-in user.
///
/// Market prices come from an external API. If that API is unavailable, the
/// page still renders with the price table empty so the user can keep
/// recording orders.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_home_page(
    State(state): State<HomePageState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    // The lock must be released before awaiting the price API.
    let (user, orders) = {
        let connection = state
            .db_connection
            .lock()
            .expect("Could not acquire database lock");

        let user = match get_user_by_id(user_id, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => {
                // The session refers to a deleted user.
                return Redirect::to(endpoints::LOG_IN_VIEW).into_response();
            }
            Err(error) => return error.into_response(),
        };

        let orders = match get_orders_by_user(user_id, &connection) {
            Ok(orders) => orders,
            Err(error) => return error.into_response(),
        };

        (user, orders)
    };

    let quotes = match state.price_client.market_quotes(&user.watchlist).await {
        Ok(quotes) => quotes,
        Err(error) => {
            tracing::warn!("Could not fetch market prices: {error}");
            Vec::new()
        }
    };

    render(
        StatusCode::OK,
        home_view(&user.watchlist, &quotes, &orders),
    )
}

fn home_view(watchlist: &[String], quotes: &[Quote], orders: &[Order]) -> Markup {
    let content = html! {
        (NavBar::new(endpoints::ROOT).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-2xl space-y-8"
            {
                section
                {
                    h2 class="text-xl font-bold mb-4" { "Market Prices" }
                    (price_table(quotes))
                    (watchlist_form(watchlist))
                }

                section
                {
                    h2 class="text-xl font-bold mb-4" { "Your Orders" }
                    (order_form())
                    (orders_table(orders))
                }
            }
        }
    };

    base("Home", &content)
}

fn price_table(quotes: &[Quote]) -> Markup {
    if quotes.is_empty() {
        return html! {
            p class="text-gray-500 dark:text-gray-400 mb-4" { "No prices available right now." }
        };
    }

    html! {
        table class="w-full text-sm text-left text-gray-500 dark:text-gray-400 mb-4"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th class=(TABLE_CELL_STYLE) { "Coin" }
                    th class=(TABLE_CELL_STYLE) { "Symbol" }
                    th class=(TABLE_CELL_STYLE) { "Price" }
                    th class=(TABLE_CELL_STYLE) { "24h" }
                }
            }

            tbody
            {
                @for quote in quotes
                {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        td class=(TABLE_CELL_STYLE) { (quote.name) }
                        td class=(TABLE_CELL_STYLE) { (quote.symbol.to_uppercase()) }
                        td class=(TABLE_CELL_STYLE)
                        {
                            @match quote.current_price {
                                Some(price) => { (format_eur(price)) }
                                None => { "-" }
                            }
                        }
                        td class=(TABLE_CELL_STYLE)
                        {
                            @match quote.price_change_percentage_24h {
                                Some(change) => { (format!("{change:+.2}%")) }
                                None => { "-" }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn watchlist_form(watchlist: &[String]) -> Markup {
    html! {
        form method="post" action=(endpoints::WATCHLIST) class="flex items-end gap-2"
        {
            div class="grow"
            {
                label for="symbols" class=(FORM_LABEL_STYLE) { "Watched coins" }
                input
                    type="text"
                    name="symbols"
                    id="symbols"
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=(watchlist.join(" "));
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) style="width: auto;"
            {
                "Update"
            }
        }
    }
}

fn order_form() -> Markup {
    html! {
        form method="post" action=(endpoints::ROOT) class="flex items-end gap-2 mb-4"
        {
            div
            {
                label for="symbol" class=(FORM_LABEL_STYLE) { "Symbol" }
                input type="text" name="symbol" id="symbol" class=(FORM_TEXT_INPUT_STYLE) required;
            }

            div
            {
                label for="bought_at" class=(FORM_LABEL_STYLE) { "Bought at (€)" }
                input
                    type="number" name="bought_at" id="bought_at" step="any"
                    class=(FORM_TEXT_INPUT_STYLE) required;
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                input
                    type="number" name="amount" id="amount" step="any"
                    class=(FORM_TEXT_INPUT_STYLE) required;
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) style="width: auto;"
            {
                "Add order"
            }
        }
    }
}

fn orders_table(orders: &[Order]) -> Markup {
    if orders.is_empty() {
        return html! {
            p class="text-gray-500 dark:text-gray-400" { "No orders recorded yet." }
        };
    }

    let date_format = format_description!("[year]-[month]-[day]");

    html! {
        table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th class=(TABLE_CELL_STYLE) { "Date" }
                    th class=(TABLE_CELL_STYLE) { "Symbol" }
                    th class=(TABLE_CELL_STYLE) { "Bought at" }
                    th class=(TABLE_CELL_STYLE) { "Amount" }
                    th class=(TABLE_CELL_STYLE) { "" }
                }
            }

            tbody
            {
                @for order in orders
                {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        td class=(TABLE_CELL_STYLE)
                        {
                            (order.created_at.format(&date_format).unwrap_or_default())
                        }
                        td class=(TABLE_CELL_STYLE) { (order.symbol.to_uppercase()) }
                        td class=(TABLE_CELL_STYLE) { (format_eur(order.bought_at)) }
                        td class=(TABLE_CELL_STYLE) { (order.amount) }
                        td class=(TABLE_CELL_STYLE)
                        {
                            button
                                hx-delete=(format_endpoint(endpoints::ORDER, order.id))
                                hx-confirm="Delete this order?"
                                class=(BUTTON_DELETE_STYLE)
                            {
                                "Delete"
                            }
                        }
                    }
                }
            }
        }
    }
}

fn format_eur(amount: f64) -> String {
    format!("€{amount:.2}")
}

#[cfg(test)]
mod home_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        PasswordHash,
        db::initialize,
        order::{NewOrder, create_order},
        prices::PriceClient,
        test_utils::{assert_valid_html, parse_html_document},
        user::{NewUser, User, create_user},
    };

    use super::{HomePageState, get_home_page};

    fn get_test_state() -> HomePageState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        HomePageState {
            db_connection: Arc::new(Mutex::new(connection)),
            // The port is unreachable, so price lookups always fail.
            price_client: PriceClient::new("http://127.0.0.1:9").unwrap(),
        }
    }

    fn insert_test_user(username: &str, state: &HomePageState) -> User {
        let connection = state.db_connection.lock().unwrap();
        create_user(
            NewUser {
                email: format!("{username}@example.com"),
                username: username.to_string(),
                password_hash: PasswordHash::new_unchecked("hunter2"),
            },
            &connection,
        )
        .expect("Could not create test user")
    }

    #[tokio::test]
    async fn home_page_renders_without_price_api() {
        let state = get_test_state();
        let user = insert_test_user("ada", &state);

        let response = get_home_page(State(state), Extension(user.id)).await;

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("No prices available right now."));
    }

    #[tokio::test]
    async fn home_page_lists_only_own_orders() {
        let state = get_test_state();
        let ada = insert_test_user("ada", &state);
        let grace = insert_test_user("grace", &state);

        {
            let connection = state.db_connection.lock().unwrap();
            for (symbol, user_id) in [("btc", ada.id), ("eth", grace.id)] {
                create_order(
                    NewOrder {
                        symbol: symbol.to_string(),
                        bought_at: 100.0,
                        amount: 1.0,
                        user_id,
                    },
                    &connection,
                )
                .expect("Could not create test order");
            }
        }

        let response = get_home_page(State(state), Extension(ada.id)).await;
        let html = parse_html_document(response).await;

        let selector = Selector::parse("tbody td").unwrap();
        let cells: Vec<String> = html
            .select(&selector)
            .map(|cell| cell.text().collect::<String>())
            .collect();

        assert!(cells.iter().any(|cell| cell.contains("BTC")));
        assert!(!cells.iter().any(|cell| cell.contains("ETH")));
    }

    #[tokio::test]
    async fn home_page_redirects_to_log_in_for_unknown_user() {
        let state = get_test_state();

        let response = get_home_page(State(state), Extension(crate::user::UserID::new(42))).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
}
