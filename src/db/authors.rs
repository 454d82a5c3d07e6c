//! Author queries.

use rusqlite::{params, Connection, OptionalExtension, Result};

#[derive(Debug, Clone)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

/// Insert a new author, returns the author ID
pub fn insert_author(conn: &Connection, name: &str) -> Result<i64> {
    conn.execute("INSERT INTO authors (name) VALUES (?1)", params![name])?;
    Ok(conn.last_insert_rowid())
}

/// Get an author by exact name
pub fn get_author_by_name(conn: &Connection, name: &str) -> Result<Option<Author>> {
    conn.query_row(
        "SELECT id, name FROM authors WHERE name = ?1",
        params![name],
        |row| {
            Ok(Author {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )
    .optional()
}

/// Get an author by ID
pub fn get_author(conn: &Connection, id: i64) -> Result<Option<Author>> {
    conn.query_row(
        "SELECT id, name FROM authors WHERE id = ?1",
        params![id],
        |row| {
            Ok(Author {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )
    .optional()
}

/// Reuse an existing author row or create one for a new name
pub fn get_or_create_author(conn: &Connection, name: &str) -> Result<i64> {
    if let Some(author) = get_author_by_name(conn, name)? {
        return Ok(author.id);
    }
    insert_author(conn, name)
}

/// Get author count
pub fn get_author_count(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM authors", [], |row| row.get(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;

    #[test]
    fn insert_and_fetch_author() {
        let env = TestEnv::new().unwrap();

        let id = insert_author(&env.conn, "Harper Lee").unwrap();
        let author = get_author(&env.conn, id).unwrap().unwrap();
        assert_eq!(author.name, "Harper Lee");

        let by_name = get_author_by_name(&env.conn, "Harper Lee").unwrap().unwrap();
        assert_eq!(by_name.id, id);
    }

    #[test]
    fn get_or_create_reuses_existing_row() {
        let env = TestEnv::new().unwrap();

        let first = get_or_create_author(&env.conn, "Sylvia Plath").unwrap();
        let second = get_or_create_author(&env.conn, "Sylvia Plath").unwrap();
        assert_eq!(first, second);
        assert_eq!(get_author_count(&env.conn).unwrap(), 1);
    }

    #[test]
    fn author_name_lookup_is_exact() {
        let env = TestEnv::new().unwrap();

        insert_author(&env.conn, "Harper Lee").unwrap();
        assert!(get_author_by_name(&env.conn, "harper lee").unwrap().is_none());
    }
}
