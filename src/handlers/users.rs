use axum::extract::State;

use crate::db::{queries, AppState};
use crate::error::{msg, AppError, OptionExt, Result};
use crate::extractors::{Json, Path};
use crate::models::{CreateUser, UpdateUser, User};

pub async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> Result<Json<User>> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }
    let conn = state.db.get()?;
    let user = queries::create_user(&conn, &input)?;
    Ok(Json(user))
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    let conn = state.db.get()?;
    Ok(Json(queries::list_users(&conn)?))
}

pub async fn get_user(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<User>> {
    let conn = state.db.get()?;
    let user = queries::get_user_by_id(&conn, id)?.or_not_found(msg::USER_NOT_FOUND)?;
    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateUser>,
) -> Result<Json<User>> {
    let conn = state.db.get()?;
    let user = match queries::update_user(&conn, id, &input)? {
        Some(user) => user,
        None => queries::get_user_by_id(&conn, id)?.or_not_found(msg::USER_NOT_FOUND)?,
    };
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    if !queries::delete_user(&conn, id)? {
        return Err(AppError::NotFound(msg::USER_NOT_FOUND.into()));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
