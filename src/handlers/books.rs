use axum::extract::State;
use serde::Deserialize;

use crate::db::{queries, AppState};
use crate::error::{msg, AppError, OptionExt, Result};
use crate::extractors::{Json, Path, Query};
use crate::models::{Book, CreateBook, UpdateBook};

pub async fn create_book(
    State(state): State<AppState>,
    Json(input): Json<CreateBook>,
) -> Result<Json<Book>> {
    if input.title.trim().is_empty() {
        return Err(AppError::BadRequest("title is required".into()));
    }
    let conn = state.db.get()?;
    let book = queries::create_book(&conn, &input)?;
    Ok(Json(book))
}

#[derive(Debug, Deserialize)]
pub struct BookListQuery {
    #[serde(default)]
    pub search: Option<String>,
}

pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BookListQuery>,
) -> Result<Json<Vec<Book>>> {
    let conn = state.db.get()?;
    let items = match query.search.as_deref() {
        Some(term) if !term.trim().is_empty() => queries::search_books(&conn, term.trim())?,
        _ => queries::list_books(&conn)?,
    };
    Ok(Json(items))
}

pub async fn get_book(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Book>> {
    let conn = state.db.get()?;
    let book = queries::get_book_by_id(&conn, id)?.or_not_found(msg::BOOK_NOT_FOUND)?;
    Ok(Json(book))
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateBook>,
) -> Result<Json<Book>> {
    let conn = state.db.get()?;
    let book = match queries::update_book(&conn, id, &input)? {
        Some(book) => book,
        None => queries::get_book_by_id(&conn, id)?.or_not_found(msg::BOOK_NOT_FOUND)?,
    };
    Ok(Json(book))
}

pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    if !queries::delete_book(&conn, id)? {
        return Err(AppError::NotFound(msg::BOOK_NOT_FOUND.into()));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
