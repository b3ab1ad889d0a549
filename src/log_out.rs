//! Log-out route handler that invalidates the session cookie and redirects users.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    auth::{get_token_from_cookies, invalidate_auth_cookie},
    endpoints,
};

/// Invalidate the session cookie and redirect the client.
///
/// A client without a valid session is sent straight to the log-in page;
/// otherwise the session cookie is invalidated and the client is sent back
/// to the home route.
pub async fn get_log_out(jar: PrivateCookieJar) -> Response {
    if get_token_from_cookies(&jar).is_err() {
        return Redirect::to(endpoints::LOG_IN_VIEW).into_response();
    }

    let jar = invalidate_auth_cookie(jar);

    (jar, Redirect::to(endpoints::ROOT)).into_response()
}
