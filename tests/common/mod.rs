//! Test utilities and fixtures for DikiTivi integration tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::connect_info::MockConnectInfo;
use axum::Router;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tower::ServiceExt;

pub use dikitivi::config::GatewayConfig;
pub use dikitivi::db::{init_db, queries, seed_config_rows, AppState};
pub use dikitivi::models::*;
pub use dikitivi::payments::status;
pub use dikitivi::sms::SmsService;

/// Create an in-memory test database with schema and config rows.
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    seed_config_rows(&conn).expect("Failed to seed config rows");
    conn
}

pub fn create_test_user(conn: &Connection, name: &str) -> User {
    let input = CreateUser {
        name: name.to_string(),
        email: Some(format!("{}@test.local", name.to_lowercase().replace(' ', "."))),
        phone: Some("+243820000001".to_string()),
    };
    queries::create_user(conn, &input).expect("Failed to create test user")
}

pub fn create_test_media(conn: &Connection, title: &str) -> Media {
    let input = CreateMedia {
        title: title.to_string(),
        description: None,
        media_url: Some(format!("https://cdn.test/{}.mp4", title.to_lowercase())),
        cover_url: None,
        for_youth: false,
    };
    queries::create_media(conn, &input).expect("Failed to create test media")
}

pub fn create_test_book(conn: &Connection, title: &str) -> Book {
    let input = CreateBook {
        title: title.to_string(),
        author: Some("Test Author".to_string()),
        file_url: None,
        cover_url: None,
    };
    queries::create_book(conn, &input).expect("Failed to create test book")
}

pub fn create_test_session(conn: &Connection, user_id: Option<i64>) -> Session {
    let input = CreateSession {
        id: None,
        ip_address: "127.0.0.1".to_string(),
        user_agent: Some("test-agent".to_string()),
        user_id,
    };
    queries::create_session(conn, &input).expect("Failed to create test session")
}

pub fn basket_type_id(conn: &Connection) -> i64 {
    queries::get_cart_type_by_name(conn, CART_TYPE_BASKET)
        .expect("Failed to query cart type")
        .expect("basket cart type missing")
        .id
}

pub fn watchlist_type_id(conn: &Connection) -> i64 {
    queries::get_cart_type_by_name(conn, CART_TYPE_WATCHLIST)
        .expect("Failed to query cart type")
        .expect("watchlist cart type missing")
        .id
}

pub fn mobile_money_type_id(conn: &Connection) -> i64 {
    queries::get_transaction_type_by_name(conn, TRANSACTION_TYPE_MOBILE_MONEY)
        .expect("Failed to query transaction type")
        .expect("mobile_money transaction type missing")
        .id
}

pub fn test_upsert_payment(order_number: &str, amount: f64, type_id: i64) -> UpsertPayment {
    UpsertPayment {
        reference: "REF-00000001-ANONYMOUS".to_string(),
        provider_reference: None,
        order_number: order_number.to_string(),
        amount,
        amount_customer: None,
        phone: Some("+243820000001".to_string()),
        currency: "CDF".to_string(),
        channel: None,
        type_id,
        status_id: status::PENDING,
        cart_id: None,
        donation_id: None,
        user_id: None,
    }
}

/// Gateway config pointing at a closed port; tests that never reach the
/// gateway do not care, tests that do override it.
pub fn test_gateway_config() -> GatewayConfig {
    GatewayConfig {
        mobile_url: "http://127.0.0.1:1/mobile".to_string(),
        card_url: "http://127.0.0.1:1/card".to_string(),
        merchant: "TESTMERCHANT".to_string(),
        api_token: "test-token".to_string(),
    }
}

/// Create an AppState for testing. Pool size 1 keeps every handler call on
/// the same in-memory database.
pub fn create_test_app_state() -> AppState {
    create_test_app_state_with_gateway(test_gateway_config())
}

pub fn create_test_app_state_with_gateway(gateway: GatewayConfig) -> AppState {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
        seed_config_rows(&conn).unwrap();
    }
    AppState {
        db: pool,
        base_url: "http://localhost:8000".to_string(),
        gateway,
        sms: Arc::new(SmsService::new(None)),
    }
}

/// Full application router with a mocked client socket address.
pub fn app(state: AppState) -> Router {
    dikitivi::handlers::router()
        .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))))
        .with_state(state)
}

/// One-shot a JSON request against the router and return (status, body).
pub async fn request_json(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (axum::http::StatusCode, serde_json::Value) {
    let builder = axum::http::Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
