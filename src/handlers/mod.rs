pub mod books;

use askama::Template;
use axum::{
  extract::State,
  http::StatusCode,
  response::{Html, IntoResponse},
};
use chrono::NaiveDate;

use crate::auth::OptionalAuth;
use crate::db::{self, BookWithAuthor};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
  pub current_user: Option<String>,
  pub books: Vec<BookRow>,
}

/// Book display row with the publish date preformatted
pub struct BookRow {
  pub id: i64,
  pub title: String,
  pub author_id: i64,
  pub author_name: String,
  pub publish_date: Option<String>,
}

impl From<BookWithAuthor> for BookRow {
  fn from(book: BookWithAuthor) -> Self {
    Self {
      id: book.id,
      title: book.title,
      author_id: book.author_id,
      author_name: book.author_name,
      publish_date: book.publish_date.map(format_publish_date),
    }
  }
}

/// Render a date like "July 11, 1960"
pub(crate) fn format_publish_date(date: NaiveDate) -> String {
  date.format("%B %-d, %Y").to_string()
}

/// GET / - Home page listing every book in the catalog
pub async fn index(
  State(state): State<AppState>,
  OptionalAuth(auth): OptionalAuth,
) -> impl IntoResponse {
  let conn = match state.db.lock() {
    Ok(conn) => conn,
    Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response(),
  };

  let books = match db::list_books(&conn) {
    Ok(books) => books,
    Err(e) => {
      tracing::error!("Book listing failed: {}", e);
      return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
    }
  };
  drop(conn);

  let template = IndexTemplate {
    current_user: auth.map(|a| a.username),
    books: books.into_iter().map(BookRow::from).collect(),
  };
  Html(template.render().unwrap_or_default()).into_response()
}
