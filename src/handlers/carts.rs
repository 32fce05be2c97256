use axum::extract::State;
use serde::Deserialize;

use crate::db::{queries, AppState};
use crate::error::{msg, AppError, OptionExt, Result};
use crate::extractors::{Json, Path, Query};
use crate::models::{Cart, CreateOrder, Order};

#[derive(Debug, Deserialize)]
pub struct CartTypePath {
    pub user_id: i64,
    pub type_id: i64,
}

/// Fetch the user's cart of the given type, creating it on first access.
/// The watchlist is a cart whose type row is named `watchlist`.
pub async fn find_cart_by_type(
    State(state): State<AppState>,
    Path(path): Path<CartTypePath>,
) -> Result<Json<Cart>> {
    let conn = state.db.get()?;
    queries::get_user_by_id(&conn, path.user_id)?.or_not_found(msg::USER_NOT_FOUND)?;
    queries::get_cart_type_by_id(&conn, path.type_id)?.or_not_found(msg::CART_TYPE_NOT_FOUND)?;
    let cart = queries::resolve_cart(&conn, path.user_id, path.type_id)?;
    Ok(Json(cart))
}

pub async fn get_cart(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Cart>> {
    let conn = state.db.get()?;
    let cart = queries::get_cart_by_id(&conn, id)?.or_not_found(msg::CART_NOT_FOUND)?;
    Ok(Json(cart))
}

pub async fn list_cart_orders(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Order>>> {
    let conn = state.db.get()?;
    queries::get_cart_by_id(&conn, id)?.or_not_found(msg::CART_NOT_FOUND)?;
    Ok(Json(queries::list_orders(&conn, id)?))
}

pub async fn add_cart_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<CreateOrder>,
) -> Result<Json<Order>> {
    if input.media_id.is_some() == input.book_id.is_some() {
        return Err(AppError::BadRequest(
            "exactly one of media_id or book_id is required".into(),
        ));
    }
    let conn = state.db.get()?;
    queries::get_cart_by_id(&conn, id)?.or_not_found(msg::CART_NOT_FOUND)?;
    if let Some(media_id) = input.media_id {
        queries::get_media_by_id(&conn, media_id)?.or_not_found(msg::MEDIA_NOT_FOUND)?;
    }
    if let Some(book_id) = input.book_id {
        queries::get_book_by_id(&conn, book_id)?.or_not_found(msg::BOOK_NOT_FOUND)?;
    }
    let order = queries::add_order(&conn, id, &input)?;
    Ok(Json(order))
}

pub async fn remove_cart_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    if !queries::remove_order(&conn, id)? {
        return Err(AppError::NotFound(msg::ORDER_NOT_FOUND.into()));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[derive(Debug, Deserialize)]
pub struct IsInCartQuery {
    pub user_id: i64,
    pub type_id: i64,
    #[serde(default)]
    pub media_id: Option<i64>,
    #[serde(default)]
    pub book_id: Option<i64>,
}

pub async fn is_in_cart(
    State(state): State<AppState>,
    Query(query): Query<IsInCartQuery>,
) -> Result<Json<serde_json::Value>> {
    if query.media_id.is_some() == query.book_id.is_some() {
        return Err(AppError::BadRequest(
            "exactly one of media_id or book_id is required".into(),
        ));
    }
    let conn = state.db.get()?;
    let present = queries::is_in_cart(
        &conn,
        query.user_id,
        query.type_id,
        query.media_id,
        query.book_id,
    )?;
    Ok(Json(serde_json::json!({ "in_cart": present })))
}
