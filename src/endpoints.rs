//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/order/{order_id}', use [format_endpoint].

/// The home page: the user's orders plus watch-list prices.
pub const ROOT: &str = "/";
/// The route for deleting a single order.
///
/// This route has its own path prefix so that unknown top-level paths fall
/// through to the 404 handler instead of matching the `{order_id}` parameter.
pub const ORDER: &str = "/order/{order_id}";
/// The route for replacing the user's watch-list.
pub const WATCHLIST: &str = "/watchlist";
/// The route for the registration page and registration form posts.
pub const REGISTER_VIEW: &str = "/register";
/// The route for the log-in page and log-in form posts.
pub const LOG_IN_VIEW: &str = "/login";
/// The route for clearing the current session.
pub const LOG_OUT: &str = "/logout";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/order/{order_id}', '{order_id}' is the
/// parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter. If no parameter is found in `endpoint_path`, the
/// function returns the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
