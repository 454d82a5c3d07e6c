//! Auth database operations (users and sessions tables).

use chrono::{Duration, Utc};
use rusqlite::{params, Connection, Result};

/// Create a new user, returns the user ID
pub fn create_user(conn: &Connection, username: &str, password_hash: &str) -> Result<i64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
        params![username, password_hash, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get user by username, returns (user_id, password_hash)
pub fn get_user_by_username(conn: &Connection, username: &str) -> Result<Option<(i64, String)>> {
    let mut stmt = conn.prepare("SELECT id, password_hash FROM users WHERE username = ?1")?;
    let result = stmt.query_row(params![username], |row| Ok((row.get(0)?, row.get(1)?)));
    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Check if a username already exists
pub fn username_exists(conn: &Connection, username: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE username = ?1",
        params![username],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Get user count
pub fn get_user_count(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
}

/// Update user's last login timestamp
pub fn update_last_login(conn: &Connection, user_id: i64) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "UPDATE users SET last_login_at = ?1 WHERE id = ?2",
        params![now, user_id],
    )?;
    Ok(())
}

/// Create a new session
pub fn create_session(
    conn: &Connection,
    user_id: i64,
    session_id: &str,
    duration_hours: i64,
) -> Result<()> {
    let now = Utc::now();
    let expires = now + Duration::hours(duration_hours);
    conn.execute(
        "INSERT INTO sessions (id, user_id, created_at, expires_at, last_access_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            session_id,
            user_id,
            now.to_rfc3339(),
            expires.to_rfc3339(),
            now.to_rfc3339()
        ],
    )?;
    Ok(())
}

/// Validate session and get user info, returns (user_id, username)
pub fn get_session_user(conn: &Connection, session_id: &str) -> Result<Option<(i64, String)>> {
    let now = Utc::now().to_rfc3339();
    let mut stmt = conn.prepare(
        r#"
        SELECT u.id, u.username
        FROM sessions s
        JOIN users u ON s.user_id = u.id
        WHERE s.id = ?1 AND s.expires_at > ?2
    "#,
    )?;
    let result = stmt.query_row(params![session_id, now], |row| Ok((row.get(0)?, row.get(1)?)));
    match result {
        Ok((user_id, username)) => {
            // Update last access time
            let _ = conn.execute(
                "UPDATE sessions SET last_access_at = ?1 WHERE id = ?2",
                params![now, session_id],
            );
            Ok(Some((user_id, username)))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Delete a session (logout)
pub fn delete_session(conn: &Connection, session_id: &str) -> Result<()> {
    conn.execute("DELETE FROM sessions WHERE id = ?1", params![session_id])?;
    Ok(())
}

/// Cleanup expired sessions, returns count of deleted sessions
pub fn cleanup_expired_sessions(conn: &Connection) -> Result<usize> {
    let now = Utc::now().to_rfc3339();
    let count = conn.execute("DELETE FROM sessions WHERE expires_at < ?1", params![now])?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;

    #[test]
    fn create_and_fetch_user() {
        let env = TestEnv::new().unwrap();

        let id = create_user(&env.conn, "me1", "hash").unwrap();
        let (found_id, hash) = get_user_by_username(&env.conn, "me1").unwrap().unwrap();
        assert_eq!(found_id, id);
        assert_eq!(hash, "hash");
        assert!(username_exists(&env.conn, "me1").unwrap());
        assert_eq!(get_user_count(&env.conn).unwrap(), 1);
    }

    #[test]
    fn username_lookup_is_case_sensitive() {
        let env = TestEnv::new().unwrap();

        create_user(&env.conn, "me1", "hash").unwrap();
        assert!(get_user_by_username(&env.conn, "ME1").unwrap().is_none());
        assert!(!username_exists(&env.conn, "Me1").unwrap());
    }

    #[test]
    fn duplicate_username_is_rejected_by_constraint() {
        let env = TestEnv::new().unwrap();

        create_user(&env.conn, "me1", "hash").unwrap();
        assert!(create_user(&env.conn, "me1", "other").is_err());
        assert_eq!(get_user_count(&env.conn).unwrap(), 1);
    }

    #[test]
    fn session_lifecycle() {
        let env = TestEnv::new().unwrap();

        let user_id = create_user(&env.conn, "me1", "hash").unwrap();
        create_session(&env.conn, user_id, "abc123", 1).unwrap();

        let (found_id, username) = get_session_user(&env.conn, "abc123").unwrap().unwrap();
        assert_eq!(found_id, user_id);
        assert_eq!(username, "me1");

        delete_session(&env.conn, "abc123").unwrap();
        assert!(get_session_user(&env.conn, "abc123").unwrap().is_none());

        // Deleting again is a no-op
        delete_session(&env.conn, "abc123").unwrap();
    }

    #[test]
    fn expired_session_is_invalid_and_swept() {
        let env = TestEnv::new().unwrap();

        let user_id = create_user(&env.conn, "me1", "hash").unwrap();
        create_session(&env.conn, user_id, "stale", -1).unwrap();
        create_session(&env.conn, user_id, "fresh", 1).unwrap();

        assert!(get_session_user(&env.conn, "stale").unwrap().is_none());
        assert_eq!(cleanup_expired_sessions(&env.conn).unwrap(), 1);
        assert!(get_session_user(&env.conn, "fresh").unwrap().is_some());
    }

    #[test]
    fn unknown_session_is_none() {
        let env = TestEnv::new().unwrap();
        assert!(get_session_user(&env.conn, "missing").unwrap().is_none());
    }
}
