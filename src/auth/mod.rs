//! Cookie-session authentication: the session token, the private cookie
//! handling, the auth guard middleware, and redirect URL helpers.

mod cookie;
mod middleware;
mod redirect;
mod token;

pub use cookie::{
    DEFAULT_COOKIE_DURATION, get_token_from_cookies, invalidate_auth_cookie, set_auth_cookie,
};
pub use middleware::{auth_guard, auth_guard_hx};
pub use redirect::normalize_redirect_url;

#[cfg(test)]
pub use cookie::COOKIE_SESSION;
