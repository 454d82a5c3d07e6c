//! Book and author page handlers.

use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    Form,
};
use chrono::NaiveDate;
use serde::Deserialize;

use super::{format_publish_date, BookRow};
use crate::auth::{AuthContext, OptionalAuth};
use crate::db;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "books/detail.html")]
pub struct BookDetailTemplate {
    pub current_user: Option<String>,
    pub title: String,
    pub author_id: i64,
    pub author_name: String,
    pub publish_date: Option<String>,
}

#[derive(Template)]
#[template(path = "books/new.html")]
pub struct NewBookTemplate {
    pub current_user: Option<String>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "authors/detail.html")]
pub struct AuthorDetailTemplate {
    pub current_user: Option<String>,
    pub name: String,
    pub books: Vec<BookRow>,
}

#[derive(Deserialize)]
pub struct NewBookForm {
    pub title: String,
    pub author_name: String,
    #[serde(default)]
    pub publish_date: String,
}

fn render_new_book(username: &str, error: Option<&str>) -> Html<String> {
    let template = NewBookTemplate {
        current_user: Some(username.to_string()),
        error: error.map(str::to_string),
    };
    Html(template.render().unwrap_or_default())
}

/// GET /books/{id} - Book detail page
pub async fn book_detail(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let book = match state.db.lock() {
        Ok(conn) => match db::get_book(&conn, id) {
            Ok(book) => book,
            Err(e) => {
                tracing::error!("Book lookup failed for {}: {}", id, e);
                return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
            }
        },
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response(),
    };

    let Some(book) = book else {
        return (StatusCode::NOT_FOUND, "Book not found").into_response();
    };

    let template = BookDetailTemplate {
        current_user: auth.map(|a| a.username),
        title: book.title,
        author_id: book.author_id,
        author_name: book.author_name,
        publish_date: book.publish_date.map(format_publish_date),
    };
    Html(template.render().unwrap_or_default()).into_response()
}

/// GET /books/new - Show the add-a-book form (login required)
pub async fn new_book_page(auth: AuthContext) -> Html<String> {
    render_new_book(&auth.username, None)
}

/// POST /books/new - Add a book (login required)
///
/// The author field is free text; an unknown name creates the author row,
/// a known one is reused.
pub async fn new_book_submit(
    State(state): State<AppState>,
    auth: AuthContext,
    Form(form): Form<NewBookForm>,
) -> impl IntoResponse {
    let title = form.title.trim();
    let author_name = form.author_name.trim();

    if title.is_empty() {
        return render_new_book(&auth.username, Some("Title is required")).into_response();
    }
    if author_name.is_empty() {
        return render_new_book(&auth.username, Some("Author is required")).into_response();
    }

    let publish_date = match form.publish_date.trim() {
        "" => None,
        raw => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                return render_new_book(
                    &auth.username,
                    Some("Publish date must be in YYYY-MM-DD format"),
                )
                .into_response();
            }
        },
    };

    let conn = match state.db.lock() {
        Ok(conn) => conn,
        Err(_) => return render_new_book(&auth.username, Some("Database error")).into_response(),
    };

    let author_id = match db::get_or_create_author(&conn, author_name) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to resolve author {}: {}", author_name, e);
            return render_new_book(&auth.username, Some("Database error")).into_response();
        }
    };

    let book_id = match db::insert_book(
        &conn,
        &db::NewBook {
            title,
            publish_date,
            author_id,
        },
    ) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to add book {}: {}", title, e);
            return render_new_book(&auth.username, Some("Failed to add book")).into_response();
        }
    };

    tracing::info!("{} added book {} ({})", auth.username, title, book_id);

    Redirect::to(&format!("/books/{}", book_id)).into_response()
}

/// GET /authors/{id} - Author detail page with the author's books
pub async fn author_detail(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let (author, books) = match state.db.lock() {
        Ok(conn) => {
            let author = match db::get_author(&conn, id) {
                Ok(author) => author,
                Err(e) => {
                    tracing::error!("Author lookup failed for {}: {}", id, e);
                    return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
                }
            };
            let books = db::list_books_by_author(&conn, id).unwrap_or_default();
            (author, books)
        }
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response(),
    };

    let Some(author) = author else {
        return (StatusCode::NOT_FOUND, "Author not found").into_response();
    };

    let template = AuthorDetailTemplate {
        current_user: auth.map(|a| a.username),
        name: author.name,
        books: books.into_iter().map(BookRow::from).collect(),
    };
    Html(template.render().unwrap_or_default()).into_response()
}
