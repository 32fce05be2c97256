use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use std::net::SocketAddr;

use serde::Deserialize;

use crate::db::{queries, AppState};
use crate::error::{msg, AppError, OptionExt, Result};
use crate::extractors::{Json, Path};
use crate::models::{CreateSession, Session};

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Open a viewing session. The ip address comes from the socket and the
/// user agent from the request headers, matching what the client cannot
/// be trusted to self-report.
pub async fn create_session(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<Session>> {
    let conn = state.db.get()?;
    if let Some(user_id) = request.user_id {
        queries::get_user_by_id(&conn, user_id)?.or_not_found(msg::USER_NOT_FOUND)?;
    }
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let session = queries::create_session(
        &conn,
        &CreateSession {
            id: None,
            ip_address: addr.ip().to_string(),
            user_agent,
            user_id: request.user_id,
        },
    )?;
    Ok(Json(session))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>> {
    let conn = state.db.get()?;
    let session = queries::get_session_by_id(&conn, &id)?.or_not_found(msg::SESSION_NOT_FOUND)?;
    Ok(Json(session))
}

#[derive(Debug, Deserialize)]
pub struct LinkSessionRequest {
    pub user_id: i64,
}

/// Attach an anonymous session to a user after login so pre-login views
/// stay attributed.
pub async fn link_session_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<LinkSessionRequest>,
) -> Result<Json<Session>> {
    let conn = state.db.get()?;
    queries::get_user_by_id(&conn, request.user_id)?.or_not_found(msg::USER_NOT_FOUND)?;
    if !queries::link_session_user(&conn, &id, request.user_id)? {
        return Err(AppError::NotFound(msg::SESSION_NOT_FOUND.into()));
    }
    let session = queries::get_session_by_id(&conn, &id)?.or_not_found(msg::SESSION_NOT_FOUND)?;
    Ok(Json(session))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    if !queries::delete_session(&conn, &id)? {
        return Err(AppError::NotFound(msg::SESSION_NOT_FOUND.into()));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
