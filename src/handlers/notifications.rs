use axum::extract::State;

use crate::db::{queries, AppState};
use crate::error::{msg, AppError, OptionExt, Result};
use crate::extractors::{Json, Path};
use crate::models::Notification;

pub async fn list_user_notifications(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Notification>>> {
    let conn = state.db.get()?;
    queries::get_user_by_id(&conn, id)?.or_not_found(msg::USER_NOT_FOUND)?;
    Ok(Json(queries::list_notifications_for_user(&conn, id)?))
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    if !queries::mark_notification_read(&conn, id)? {
        return Err(AppError::NotFound(msg::NOTIFICATION_NOT_FOUND.into()));
    }
    Ok(Json(serde_json::json!({ "read": true })))
}
