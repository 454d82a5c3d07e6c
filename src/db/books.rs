//! Book queries.
//!
//! Books always join their author for display, so the row type carries the
//! author name alongside the book columns. Publish dates are stored as
//! ISO `YYYY-MM-DD` text and parsed back into `NaiveDate`.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};

/// Book row joined with its author
#[derive(Debug, Clone)]
pub struct BookWithAuthor {
    pub id: i64,
    pub title: String,
    pub publish_date: Option<NaiveDate>,
    pub author_id: i64,
    pub author_name: String,
}

/// Fields for a new book row
pub struct NewBook<'a> {
    pub title: &'a str,
    pub publish_date: Option<NaiveDate>,
    pub author_id: i64,
}

const BOOK_COLUMNS: &str = r#"
    SELECT b.id, b.title, b.publish_date, b.author_id, a.name
    FROM books b
    JOIN authors a ON b.author_id = a.id
"#;

fn row_to_book(row: &Row<'_>) -> Result<BookWithAuthor> {
    let publish_date: Option<String> = row.get(2)?;
    Ok(BookWithAuthor {
        id: row.get(0)?,
        title: row.get(1)?,
        publish_date: publish_date
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        author_id: row.get(3)?,
        author_name: row.get(4)?,
    })
}

/// Insert a new book, returns the book ID
pub fn insert_book(conn: &Connection, book: &NewBook<'_>) -> Result<i64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO books (title, publish_date, author_id, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            book.title,
            book.publish_date.map(|d| d.format("%Y-%m-%d").to_string()),
            book.author_id,
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// List all books with their authors, ordered by title
pub fn list_books(conn: &Connection) -> Result<Vec<BookWithAuthor>> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY b.title", BOOK_COLUMNS))?;
    let books = stmt
        .query_map([], |row| row_to_book(row))?
        .filter_map(|r| r.ok())
        .collect();
    Ok(books)
}

/// Get a book by ID
pub fn get_book(conn: &Connection, id: i64) -> Result<Option<BookWithAuthor>> {
    conn.query_row(
        &format!("{} WHERE b.id = ?1", BOOK_COLUMNS),
        params![id],
        |row| row_to_book(row),
    )
    .optional()
}

/// List an author's books, ordered by title
pub fn list_books_by_author(conn: &Connection, author_id: i64) -> Result<Vec<BookWithAuthor>> {
    let mut stmt = conn.prepare(&format!("{} WHERE b.author_id = ?1 ORDER BY b.title", BOOK_COLUMNS))?;
    let books = stmt
        .query_map(params![author_id], |row| row_to_book(row))?
        .filter_map(|r| r.ok())
        .collect();
    Ok(books)
}

/// Get book count
pub fn get_book_count(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))
}
