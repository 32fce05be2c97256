//! Handler-level tests for carts, catalog CRUD, sessions, and engagement.

use serde_json::json;

mod common;
use common::*;

#[tokio::test]
async fn test_find_cart_by_type_creates_and_reuses() {
    let state = create_test_app_state();
    let (user_id, type_id) = {
        let conn = state.db.get().unwrap();
        (create_test_user(&conn, "Viewer").id, watchlist_type_id(&conn))
    };

    let uri = format!("/cart/find_by_type/{}/{}", user_id, type_id);
    let (status_code, first) = request_json(app(state.clone()), "GET", &uri, None).await;
    assert_eq!(status_code, axum::http::StatusCode::OK);

    let (status_code, second) = request_json(app(state), "GET", &uri, None).await;
    assert_eq!(status_code, axum::http::StatusCode::OK);
    assert_eq!(first["id"], second["id"]);
}

#[tokio::test]
async fn test_find_cart_by_type_unknown_user() {
    let state = create_test_app_state();
    let type_id = {
        let conn = state.db.get().unwrap();
        watchlist_type_id(&conn)
    };

    let (status_code, _) = request_json(
        app(state),
        "GET",
        &format!("/cart/find_by_type/999/{}", type_id),
        None,
    )
    .await;
    assert_eq!(status_code, axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cart_order_requires_exactly_one_item() {
    let state = create_test_app_state();
    let cart_id = {
        let conn = state.db.get().unwrap();
        let user = create_test_user(&conn, "Shopper");
        queries::resolve_cart(&conn, user.id, basket_type_id(&conn)).unwrap().id
    };

    let (status_code, _) = request_json(
        app(state.clone()),
        "POST",
        &format!("/carts/{}/orders", cart_id),
        Some(json!({})),
    )
    .await;
    assert_eq!(status_code, axum::http::StatusCode::BAD_REQUEST);

    let (status_code, _) = request_json(
        app(state),
        "POST",
        &format!("/carts/{}/orders", cart_id),
        Some(json!({ "media_id": 1, "book_id": 1 })),
    )
    .await;
    assert_eq!(status_code, axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_user_crud_roundtrip() {
    let state = create_test_app_state();

    let (status_code, created) = request_json(
        app(state.clone()),
        "POST",
        "/users",
        Some(json!({ "name": "New Viewer", "email": "Viewer@Example.COM" })),
    )
    .await;
    assert_eq!(status_code, axum::http::StatusCode::OK);
    // Emails are normalized on write
    assert_eq!(created["email"], "viewer@example.com");
    let id = created["id"].as_i64().unwrap();

    let (status_code, updated) = request_json(
        app(state.clone()),
        "PUT",
        &format!("/users/{}", id),
        Some(json!({ "name": "Renamed Viewer" })),
    )
    .await;
    assert_eq!(status_code, axum::http::StatusCode::OK);
    assert_eq!(updated["name"], "Renamed Viewer");
    assert_eq!(updated["email"], "viewer@example.com");

    let (status_code, _) = request_json(
        app(state.clone()),
        "DELETE",
        &format!("/users/{}", id),
        None,
    )
    .await;
    assert_eq!(status_code, axum::http::StatusCode::OK);

    let (status_code, _) =
        request_json(app(state), "GET", &format!("/users/{}", id), None).await;
    assert_eq!(status_code, axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_user_duplicate_email_conflict() {
    let state = create_test_app_state();

    let body = json!({ "name": "First", "email": "taken@example.com" });
    let (status_code, _) =
        request_json(app(state.clone()), "POST", "/users", Some(body)).await;
    assert_eq!(status_code, axum::http::StatusCode::OK);

    let body = json!({ "name": "Second", "email": "taken@example.com" });
    let (status_code, response) =
        request_json(app(state.clone()), "POST", "/users", Some(body)).await;
    assert_eq!(status_code, axum::http::StatusCode::CONFLICT);
    assert_eq!(response["error"], "Conflict");

    let conn = state.db.get().unwrap();
    assert_eq!(queries::list_users(&conn).unwrap().len(), 1);
}

#[tokio::test]
async fn test_media_show_counts_views_per_session() {
    let state = create_test_app_state();
    let (media_id, session_id) = {
        let conn = state.db.get().unwrap();
        let media = create_test_media(&conn, "Nightly Show");
        let session = create_test_session(&conn, None);
        (media.id, session.id)
    };

    let uri = format!("/media/{}?session_id={}", media_id, session_id);
    let (_, first) = request_json(app(state.clone()), "GET", &uri, None).await;
    assert_eq!(first["views"], 1);
    assert_eq!(first["title"], "Nightly Show");

    let (_, second) = request_json(app(state.clone()), "GET", &uri, None).await;
    assert_eq!(second["views"], 2);

    // No session, no view recorded
    let (_, third) = request_json(
        app(state),
        "GET",
        &format!("/media/{}", media_id),
        None,
    )
    .await;
    assert_eq!(third["views"], 2);
}

#[tokio::test]
async fn test_media_like_is_idempotent() {
    let state = create_test_app_state();
    let (media_id, user_id) = {
        let conn = state.db.get().unwrap();
        (
            create_test_media(&conn, "Concert").id,
            create_test_user(&conn, "Fan").id,
        )
    };

    let uri = format!("/media/{}/like", media_id);
    let body = json!({ "user_id": user_id });

    let (_, first) = request_json(app(state.clone()), "POST", &uri, Some(body.clone())).await;
    assert_eq!(first["likes"], 1);

    let (_, second) = request_json(app(state.clone()), "POST", &uri, Some(body.clone())).await;
    assert_eq!(second["likes"], 1);

    let (_, third) = request_json(app(state), "DELETE", &uri, Some(body)).await;
    assert_eq!(third["likes"], 0);
}

#[tokio::test]
async fn test_media_search() {
    let state = create_test_app_state();
    {
        let conn = state.db.get().unwrap();
        create_test_media(&conn, "Morning Praise");
        create_test_media(&conn, "Evening News");
    }

    let (_, all) = request_json(app(state.clone()), "GET", "/media", None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, filtered) =
        request_json(app(state), "GET", "/media?search=Praise", None).await;
    assert_eq!(filtered.as_array().unwrap().len(), 1);
    assert_eq!(filtered[0]["title"], "Morning Praise");
}

#[tokio::test]
async fn test_session_create_and_link_user() {
    let state = create_test_app_state();
    let user_id = {
        let conn = state.db.get().unwrap();
        create_test_user(&conn, "Late Login").id
    };

    let (status_code, session) =
        request_json(app(state.clone()), "POST", "/sessions", Some(json!({}))).await;
    assert_eq!(status_code, axum::http::StatusCode::OK);
    assert_eq!(session["ip_address"], "127.0.0.1");
    assert!(session["user_id"].is_null());
    let session_id = session["id"].as_str().unwrap().to_string();

    let (status_code, linked) = request_json(
        app(state),
        "PUT",
        &format!("/sessions/{}/user", session_id),
        Some(json!({ "user_id": user_id })),
    )
    .await;
    assert_eq!(status_code, axum::http::StatusCode::OK);
    assert_eq!(linked["user_id"], user_id);
}

#[tokio::test]
async fn test_notifications_list_and_mark_read() {
    let state = create_test_app_state();
    let (user_id, notification_id) = {
        let conn = state.db.get().unwrap();
        let user = create_test_user(&conn, "Notified");
        let notification = queries::create_notification(
            &conn,
            &CreateNotification {
                user_id: user.id,
                subject: Some("Payment received".to_string()),
                body: "Your payment was confirmed".to_string(),
            },
        )
        .unwrap();
        (user.id, notification.id)
    };

    let (_, list) = request_json(
        app(state.clone()),
        "GET",
        &format!("/users/{}/notifications", user_id),
        None,
    )
    .await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["read"], false);

    let (status_code, _) = request_json(
        app(state.clone()),
        "POST",
        &format!("/notifications/{}/read", notification_id),
        None,
    )
    .await;
    assert_eq!(status_code, axum::http::StatusCode::OK);

    let (_, list) = request_json(
        app(state),
        "GET",
        &format!("/users/{}/notifications", user_id),
        None,
    )
    .await;
    assert_eq!(list[0]["read"], true);
}
