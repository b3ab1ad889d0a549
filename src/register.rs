//! The registration page for creating a new account.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::set_auth_cookie,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, auth_card, base, link, password_input, text_input},
    internal_server_error::get_internal_server_error_redirect,
    user::{NewUser, create_user},
};

/// The error messages to display inline next to each form field.
#[derive(Default)]
struct RegistrationFormErrors<'a> {
    email: Option<&'a str>,
    username: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn registration_form(email: &str, username: &str, errors: RegistrationFormErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::REGISTER_VIEW)
            class="space-y-4 md:space-y-6"
        {
            (text_input("email", "email", "Email", email, errors.email))
            (text_input("text", "username", "Username", username, errors.username))
            (password_input("password", "Password", errors.password))
            (password_input("confirm_password", "Confirm Password", errors.confirm_password))

            button
                type="submit" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                "Register"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN_VIEW, "Log in here"))
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form("", "", RegistrationFormErrors::default());
    let content = auth_card("Create an account", &registration_form);
    base("Register", &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The data submitted by the registration form.
#[derive(Deserialize)]
pub struct RegisterForm {
    /// The email address for the new account.
    pub email: String,
    /// The username for the new account.
    pub username: String,
    /// The password for the new account, in plain text.
    pub password: String,
    /// Repeated password for catching typos.
    pub confirm_password: String,
}

/// Handler for registration requests via the POST method.
///
/// On success, the new user is logged in straight away and redirected to the
/// home page. Otherwise, the form is returned with error messages against the
/// offending fields.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let email = user_data.email.trim();
    let username = user_data.username.trim();

    if !email.contains('@') {
        return registration_form(
            email,
            username,
            RegistrationFormErrors {
                email: Some("Please enter a valid email address."),
                ..Default::default()
            },
        )
        .into_response();
    }

    if username.is_empty() {
        return registration_form(
            email,
            username,
            RegistrationFormErrors {
                username: Some("Please enter a username."),
                ..Default::default()
            },
        )
        .into_response();
    }

    let validated_password = match ValidatedPassword::new(&user_data.password) {
        Ok(password) => password,
        Err(error) => {
            return registration_form(
                email,
                username,
                RegistrationFormErrors {
                    password: Some(error.to_string().as_ref()),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    if user_data.password != user_data.confirm_password {
        return registration_form(
            email,
            username,
            RegistrationFormErrors {
                confirm_password: Some("Passwords do not match"),
                ..Default::default()
            },
        )
        .into_response();
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("an error occurred while hashing a password: {e}");

            return get_internal_server_error_redirect();
        }
    };

    let user = create_user(
        NewUser {
            email: email.to_owned(),
            username: username.to_owned(),
            password_hash,
        },
        &state
            .db_connection
            .lock()
            .expect("Could not acquire database lock"),
    );

    let user = match user {
        Ok(user) => user,
        Err(Error::DuplicateEmail) => {
            return registration_form(
                email,
                username,
                RegistrationFormErrors {
                    email: Some("An account with this email already exists."),
                    ..Default::default()
                },
            )
            .into_response();
        }
        Err(Error::DuplicateUsername) => {
            return registration_form(
                email,
                username,
                RegistrationFormErrors {
                    username: Some("This username is taken."),
                    ..Default::default()
                },
            )
            .into_response();
        }
        Err(e) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {e}");

            return get_internal_server_error_redirect();
        }
    };

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::ROOT.to_owned()),
            jar,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("An error occurred while setting the auth cookie: {e}");

            get_internal_server_error_redirect()
        }
    }
}
