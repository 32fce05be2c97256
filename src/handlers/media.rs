use axum::extract::State;
use serde::Deserialize;

use crate::db::{queries, AppState};
use crate::error::{msg, AppError, OptionExt, Result};
use crate::extractors::{Json, Path, Query};
use crate::models::{CreateMedia, Media, MediaWithStats, UpdateMedia};

pub async fn create_media(
    State(state): State<AppState>,
    Json(input): Json<CreateMedia>,
) -> Result<Json<Media>> {
    if input.title.trim().is_empty() {
        return Err(AppError::BadRequest("title is required".into()));
    }
    let conn = state.db.get()?;
    let media = queries::create_media(&conn, &input)?;
    Ok(Json(media))
}

#[derive(Debug, Deserialize)]
pub struct MediaListQuery {
    #[serde(default)]
    pub search: Option<String>,
}

pub async fn list_media(
    State(state): State<AppState>,
    Query(query): Query<MediaListQuery>,
) -> Result<Json<Vec<Media>>> {
    let conn = state.db.get()?;
    let items = match query.search.as_deref() {
        Some(term) if !term.trim().is_empty() => queries::search_media(&conn, term.trim())?,
        _ => queries::list_media(&conn)?,
    };
    Ok(Json(items))
}

#[derive(Debug, Deserialize)]
pub struct ShowMediaQuery {
    /// When present, the view is counted against this session.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Fetch one media item with its view and like counters. Passing a session
/// id records the view; repeat views by the same session bump the same row.
pub async fn show_media(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ShowMediaQuery>,
) -> Result<Json<MediaWithStats>> {
    let conn = state.db.get()?;
    let media = queries::get_media_by_id(&conn, id)?.or_not_found(msg::MEDIA_NOT_FOUND)?;

    if let Some(session_id) = query.session_id.as_deref() {
        match queries::get_session_by_id(&conn, session_id)? {
            Some(_) => queries::record_media_view(&conn, session_id, id)?,
            None => tracing::debug!(session_id, "view with unknown session ignored"),
        }
    }

    let views = queries::media_view_count(&conn, id)?;
    let likes = queries::media_like_count(&conn, id)?;
    Ok(Json(MediaWithStats { media, views, likes }))
}

pub async fn update_media(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateMedia>,
) -> Result<Json<Media>> {
    let conn = state.db.get()?;
    let media = match queries::update_media(&conn, id, &input)? {
        Some(media) => media,
        None => queries::get_media_by_id(&conn, id)?.or_not_found(msg::MEDIA_NOT_FOUND)?,
    };
    Ok(Json(media))
}

pub async fn delete_media(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    if !queries::delete_media(&conn, id)? {
        return Err(AppError::NotFound(msg::MEDIA_NOT_FOUND.into()));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    pub user_id: i64,
}

pub async fn like_media(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<LikeRequest>,
) -> Result<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    queries::get_media_by_id(&conn, id)?.or_not_found(msg::MEDIA_NOT_FOUND)?;
    queries::get_user_by_id(&conn, request.user_id)?.or_not_found(msg::USER_NOT_FOUND)?;
    queries::like_media(&conn, request.user_id, id)?;
    let likes = queries::media_like_count(&conn, id)?;
    Ok(Json(serde_json::json!({ "liked": true, "likes": likes })))
}

pub async fn unlike_media(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<LikeRequest>,
) -> Result<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    queries::get_media_by_id(&conn, id)?.or_not_found(msg::MEDIA_NOT_FOUND)?;
    queries::unlike_media(&conn, request.user_id, id)?;
    let likes = queries::media_like_count(&conn, id)?;
    Ok(Json(serde_json::json!({ "liked": false, "likes": likes })))
}
