//! HTTP-level tests for signup, login, and logout.

use axum::http::StatusCode;
use axum_test::{TestServer, TestServerConfig};
use serde::Serialize;

use bookshelf::db::{self, DbPool};
use bookshelf::routes::router;
use bookshelf::state::AppState;
use bookshelf::testing;

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

/// Server over a fresh in-memory database, with a cookie jar so a login
/// carries over to later requests.
fn test_server() -> (TestServer, DbPool) {
    let pool = db::init_db_in_memory().expect("in-memory database");
    let config = TestServerConfig {
        save_cookies: true,
        ..TestServerConfig::default()
    };
    let server = TestServer::new_with_config(router(AppState::new(pool.clone())), config)
        .expect("test server");
    (server, pool)
}

fn create_user(pool: &DbPool, username: &str, password: &str) {
    let conn = pool.lock().expect("database lock");
    testing::create_test_user(&conn, username, password).expect("create user");
}

#[tokio::test]
async fn signup_creates_user() {
    let (server, pool) = test_server();

    let response = server
        .post("/signup")
        .form(&Credentials {
            username: "josh",
            password: "password",
        })
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/login");

    let conn = pool.lock().expect("database lock");
    let user = bookshelf::auth::db::get_user_by_username(&conn, "josh").expect("user query");
    assert!(user.is_some());
}

#[tokio::test]
async fn signup_rejects_taken_username() {
    let (server, pool) = test_server();
    create_user(&pool, "me1", "password");

    let response = server
        .post("/signup")
        .form(&Credentials {
            username: "me1",
            password: "password",
        })
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let text = response.text();
    assert!(text.contains("That username is taken. Please choose a different one."));

    // Still exactly one me1 row
    let conn = pool.lock().expect("database lock");
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM users WHERE username = 'me1'",
            [],
            |row| row.get(0),
        )
        .expect("count query");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn login_with_correct_password_authenticates() {
    let (server, pool) = test_server();
    create_user(&pool, "me1", "password");

    let response = server
        .post("/login")
        .form(&Credentials {
            username: "me1",
            password: "password",
        })
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/");

    // The login control disappears once a session is established
    let home = server.get("/").await;
    assert_eq!(home.status_code(), StatusCode::OK);
    assert!(!home.text().contains("<a href=\"/login\">Log In</a>"));
}

#[tokio::test]
async fn login_with_unknown_username_shows_error() {
    let (server, _pool) = test_server();

    let response = server
        .post("/login")
        .form(&Credentials {
            username: "fake_user",
            password: "very secure password",
        })
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let text = response.text();
    assert!(text.contains("No user with that username. Please try again."));
    // The login form itself is redisplayed
    assert!(text.contains("<form action=\"/login\" method=\"POST\">"));
}

#[tokio::test]
async fn login_with_wrong_password_shows_error() {
    let (server, pool) = test_server();
    create_user(&pool, "me1", "password");

    let response = server
        .post("/login")
        .form(&Credentials {
            username: "me1",
            password: "incorrect_password",
        })
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let text = response.text();
    // The apostrophe comes back HTML-escaped
    assert!(text.contains("Password doesn&#x27;t match. Please try again."));
    assert!(text.contains("<form action=\"/login\" method=\"POST\">"));
}

#[tokio::test]
async fn login_error_does_not_establish_session() {
    let (server, pool) = test_server();
    create_user(&pool, "me1", "password");

    server
        .post("/login")
        .form(&Credentials {
            username: "me1",
            password: "incorrect_password",
        })
        .await;

    let home = server.get("/").await;
    assert!(home.text().contains("<a href=\"/login\">Log In</a>"));
}

#[tokio::test]
async fn logout_clears_session() {
    let (server, pool) = test_server();
    create_user(&pool, "me1", "password");

    let login = server
        .post("/login")
        .form(&Credentials {
            username: "me1",
            password: "password",
        })
        .await;
    assert_eq!(login.status_code(), StatusCode::SEE_OTHER);

    let logout = server.get("/logout").await;
    assert_eq!(logout.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(logout.header("location"), "/");

    // Back to the logged-out home page
    let home = server.get("/").await;
    assert_eq!(home.status_code(), StatusCode::OK);
    assert!(home.text().contains("<a href=\"/login\">Log In</a>"));

    // The session row is gone, not just the cookie
    let conn = pool.lock().expect("database lock");
    let sessions: i64 = conn
        .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))
        .expect("count query");
    assert_eq!(sessions, 0);
}

#[tokio::test]
async fn logout_without_session_is_harmless() {
    let (server, _pool) = test_server();

    let response = server.get("/logout").await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/");
}

#[tokio::test]
async fn signup_rejects_invalid_username() {
    let (server, pool) = test_server();

    let response = server
        .post("/signup")
        .form(&Credentials {
            username: "no spaces allowed",
            password: "password",
        })
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response
        .text()
        .contains("Username must be 3-32 alphanumeric characters or underscores"));

    let conn = pool.lock().expect("database lock");
    assert_eq!(bookshelf::auth::db::get_user_count(&conn).expect("count"), 0);
}
