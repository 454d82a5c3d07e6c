//! Test utilities for database setup.
//!
//! Provides helpers that reuse authoritative schema initialization,
//! eliminating schema duplication in test code.

use chrono::NaiveDate;
use rusqlite::{Connection, Result};

use crate::auth::{db as auth_db, password};
use crate::db::{self, schema, NewBook};

/// In-memory database with the full schema applied.
pub struct TestEnv {
    pub conn: Connection,
}

impl TestEnv {
    pub fn new() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::run_migrations(&conn)?;
        Ok(Self { conn })
    }
}

/// Seed the two-book fixture catalog.
pub fn seed_catalog(conn: &Connection) -> Result<()> {
    let harper_lee = db::get_or_create_author(conn, "Harper Lee")?;
    db::insert_book(
        conn,
        &NewBook {
            title: "To Kill a Mockingbird",
            publish_date: NaiveDate::from_ymd_opt(1960, 7, 11),
            author_id: harper_lee,
        },
    )?;

    let sylvia_plath = db::get_or_create_author(conn, "Sylvia Plath")?;
    db::insert_book(
        conn,
        &NewBook {
            title: "The Bell Jar",
            publish_date: None,
            author_id: sylvia_plath,
        },
    )?;

    Ok(())
}

/// Create a user whose stored hash is a real Argon2 hash of `password_text`,
/// so login flows exercise actual verification. Returns the user ID.
pub fn create_test_user(conn: &Connection, username: &str, password_text: &str) -> Result<i64> {
    let hash =
        password::hash_password(password_text).map_err(|_| rusqlite::Error::InvalidQuery)?;
    auth_db::create_user(conn, username, &hash)
}
