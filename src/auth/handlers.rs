//! Authentication handlers for signup, login, and logout.

use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;

use super::db as auth_db;
use super::middleware::SESSION_COOKIE_NAME;
use super::password;
use crate::session::generate_session_id;
use crate::state::AppState;

/// Session duration in hours (1 week)
const SESSION_DURATION_HOURS: i64 = 24 * 7;

/// Shown when signup hits an existing username
const USERNAME_TAKEN: &str = "That username is taken. Please choose a different one.";
/// Shown when login names a user that doesn't exist
const UNKNOWN_USER: &str = "No user with that username. Please try again.";
/// Shown when login has the wrong password for an existing user
const PASSWORD_MISMATCH: &str = "Password doesn't match. Please try again.";

#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub current_user: Option<String>,
}

#[derive(Template)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub error: Option<String>,
    pub current_user: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
}

fn render_login(error: Option<&str>) -> Html<String> {
    let template = LoginTemplate {
        error: error.map(str::to_string),
        current_user: None,
    };
    Html(template.render().unwrap_or_default())
}

fn render_signup(error: Option<&str>) -> Html<String> {
    let template = SignupTemplate {
        error: error.map(str::to_string),
        current_user: None,
    };
    Html(template.render().unwrap_or_default())
}

/// GET /login - Show login page
pub async fn login_page() -> Html<String> {
    render_login(None)
}

/// POST /login - Process login
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> impl IntoResponse {
    if form.username.is_empty() || form.password.is_empty() {
        return (jar, render_login(Some("Username and password are required"))).into_response();
    }

    let conn = match state.db.lock() {
        Ok(conn) => conn,
        Err(_) => {
            return (jar, render_login(Some("Database error"))).into_response();
        }
    };

    // Look up user
    let (user_id, password_hash) = match auth_db::get_user_by_username(&conn, &form.username) {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (jar, render_login(Some(UNKNOWN_USER))).into_response();
        }
        Err(e) => {
            tracing::error!("User lookup failed for {}: {}", form.username, e);
            return (jar, render_login(Some("Database error"))).into_response();
        }
    };

    if !password::verify_password(&form.password, &password_hash) {
        return (jar, render_login(Some(PASSWORD_MISMATCH))).into_response();
    }

    // Update last login time (log but don't fail on error)
    if let Err(e) = auth_db::update_last_login(&conn, user_id) {
        tracing::warn!("Failed to update last login for user {}: {}", user_id, e);
    }

    // Create session
    let session_id = generate_session_id();
    if auth_db::create_session(&conn, user_id, &session_id, SESSION_DURATION_HOURS).is_err() {
        return (jar, render_login(Some("Failed to create session"))).into_response();
    }

    drop(conn);

    tracing::debug!("User {} logged in", form.username);

    let session_cookie = Cookie::build((SESSION_COOKIE_NAME, session_id))
        .path("/")
        .http_only(true)
        .secure(false) // Set to true in production with HTTPS
        .max_age(time::Duration::hours(SESSION_DURATION_HOURS))
        .build();

    (jar.add(session_cookie), Redirect::to("/")).into_response()
}

/// GET /signup - Show signup page
pub async fn signup_page() -> Html<String> {
    render_signup(None)
}

/// POST /signup - Process signup
pub async fn signup_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> impl IntoResponse {
    if form.username.is_empty() || form.password.is_empty() {
        return (jar, render_signup(Some("Username and password are required"))).into_response();
    }

    if !is_valid_username(&form.username) {
        return (
            jar,
            render_signup(Some(
                "Username must be 3-32 alphanumeric characters or underscores",
            )),
        )
            .into_response();
    }

    // Hash the password for storage
    let password_hash = match password::hash_password(&form.password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("Password hashing failed: {}", e);
            return (jar, render_signup(Some("Failed to process password"))).into_response();
        }
    };

    let conn = match state.db.lock() {
        Ok(conn) => conn,
        Err(_) => {
            return (jar, render_signup(Some("Database error"))).into_response();
        }
    };

    // Check if username already exists (exact match)
    match auth_db::username_exists(&conn, &form.username) {
        Ok(true) => {
            return (jar, render_signup(Some(USERNAME_TAKEN))).into_response();
        }
        Err(e) => {
            tracing::error!("Username check failed for {}: {}", form.username, e);
            return (jar, render_signup(Some("Database error"))).into_response();
        }
        Ok(false) => {}
    }

    if let Err(e) = auth_db::create_user(&conn, &form.username, &password_hash) {
        tracing::error!("Failed to create user {}: {}", form.username, e);
        return (jar, render_signup(Some("Failed to create account"))).into_response();
    }

    drop(conn);

    tracing::info!("New account: {}", form.username);

    // Account created; the user logs in from the login page
    (jar, Redirect::to("/login")).into_response()
}

/// GET /logout - Log out and clear session
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    // Get session from cookie and delete it
    if let Some(session_cookie) = jar.get(SESSION_COOKIE_NAME) {
        let session_id = session_cookie.value();
        if let Ok(conn) = state.db.lock() {
            if let Err(e) = auth_db::delete_session(&conn, session_id) {
                tracing::warn!("Failed to delete session during logout: {}", e);
            }
        }
    }

    // Remove session cookie
    let session_cookie = Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .max_age(time::Duration::seconds(0))
        .build();

    (jar.remove(session_cookie), Redirect::to("/"))
}

/// Validate username: 3-32 chars, alphanumeric or underscore
fn is_valid_username(username: &str) -> bool {
    username.len() >= 3
        && username.len() <= 32
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(is_valid_username("abc"));
        assert!(is_valid_username("me1"));
        assert!(is_valid_username("fake_user"));
        assert!(is_valid_username("User_Name_123"));
        assert!(is_valid_username("a".repeat(32).as_str()));
    }

    #[test]
    fn test_invalid_usernames() {
        assert!(!is_valid_username("ab")); // too short
        assert!(!is_valid_username(&"a".repeat(33))); // too long
        assert!(!is_valid_username("user name")); // space
        assert!(!is_valid_username("user-name")); // hyphen
        assert!(!is_valid_username("user@name")); // special char
        assert!(!is_valid_username("")); // empty
    }
}
