//! Tests for the gateway callback endpoint and payment lookups.

use serde_json::json;

mod common;
use common::*;

fn callback_body(order_number: &str, reference: &str, code: i64) -> serde_json::Value {
    json!({
        "code": code,
        "reference": reference,
        "orderNumber": order_number,
        "amount": 5000.0,
        "phone": "+243820000001",
        "currency": "CDF",
        "channel": "mpesa"
    })
}

#[tokio::test]
async fn test_callback_records_completed_payment() {
    let state = create_test_app_state();

    let (status_code, body) = request_json(
        app(state.clone()),
        "POST",
        "/payment/store",
        Some(callback_body("ORD-CB-1", "REF-12345678-ANONYMOUS", 0)),
    )
    .await;

    assert_eq!(status_code, axum::http::StatusCode::OK);
    assert_eq!(body["order_number"], "ORD-CB-1");
    assert_eq!(body["status_id"], status::COMPLETED);
    assert!(body["user_id"].is_null());
}

#[tokio::test]
async fn test_callback_failed_code_marks_payment_failed() {
    let state = create_test_app_state();

    let (status_code, body) = request_json(
        app(state),
        "POST",
        "/payment/store",
        Some(callback_body("ORD-CB-2", "REF-12345678-ANONYMOUS", 1)),
    )
    .await;

    assert_eq!(status_code, axum::http::StatusCode::OK);
    assert_eq!(body["status_id"], status::FAILED);
}

#[tokio::test]
async fn test_duplicate_callback_single_row() {
    let state = create_test_app_state();

    let (first_status, _) = request_json(
        app(state.clone()),
        "POST",
        "/payment/store",
        Some(callback_body("ORD-CB-3", "REF-12345678-ANONYMOUS", 0)),
    )
    .await;
    assert_eq!(first_status, axum::http::StatusCode::OK);

    let (second_status, _) = request_json(
        app(state.clone()),
        "POST",
        "/payment/store",
        Some(callback_body("ORD-CB-3", "REF-12345678-ANONYMOUS", 0)),
    )
    .await;
    assert_eq!(second_status, axum::http::StatusCode::OK);

    let conn = state.db.get().unwrap();
    assert_eq!(queries::list_payments(&conn).unwrap().len(), 1);
}

#[tokio::test]
async fn test_callback_with_cart_reference_rotates_payment_code() {
    let state = create_test_app_state();
    let (user_id, cart_id, reference) = {
        let conn = state.db.get().unwrap();
        let user = create_test_user(&conn, "Shopper");
        let cart = queries::resolve_cart(&conn, user.id, basket_type_id(&conn)).unwrap();
        let reference = dikitivi::reference::encode(Some(user.id), Some(cart.id), None);
        (user.id, cart.id, reference)
    };

    let (status_code, body) = request_json(
        app(state.clone()),
        "POST",
        "/payment/store",
        Some(callback_body("ORD-CB-4", &reference, 0)),
    )
    .await;

    assert_eq!(status_code, axum::http::StatusCode::OK);
    assert_eq!(body["cart_id"], cart_id);
    assert_eq!(body["user_id"], user_id);

    let conn = state.db.get().unwrap();
    let cart = queries::get_cart_by_id(&conn, cart_id).unwrap().unwrap();
    let code = cart.payment_code.expect("payment code should be rotated");
    assert_eq!(code.len(), 7);
}

#[tokio::test]
async fn test_callback_with_numeric_type_code_still_recorded() {
    let state = create_test_app_state();

    let mut body = callback_body("ORD-CB-6", "REF-12345678-ANONYMOUS", 0);
    body["type"] = json!("1");

    let (status_code, response) =
        request_json(app(state.clone()), "POST", "/payment/store", Some(body)).await;

    // A settled transaction must be recorded no matter how the gateway
    // labels its type
    assert_eq!(status_code, axum::http::StatusCode::OK);
    assert_eq!(response["type_id"], 1);
    assert_eq!(response["status_id"], status::COMPLETED);

    let conn = state.db.get().unwrap();
    assert!(queries::get_payment_by_order_number(&conn, "ORD-CB-6")
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_callback_with_unknown_type_falls_back_to_default() {
    let state = create_test_app_state();

    let mut body = callback_body("ORD-CB-7", "REF-12345678-ANONYMOUS", 0);
    body["type"] = json!("carrier_billing");

    let (status_code, response) =
        request_json(app(state.clone()), "POST", "/payment/store", Some(body)).await;

    assert_eq!(status_code, axum::http::StatusCode::OK);

    let default_id = {
        let conn = state.db.get().unwrap();
        mobile_money_type_id(&conn)
    };
    assert_eq!(response["type_id"], default_id);

    // Bare JSON numbers are accepted too
    let mut body = callback_body("ORD-CB-8", "REF-12345678-ANONYMOUS", 0);
    body["type"] = json!(2);
    let (status_code, response) =
        request_json(app(state), "POST", "/payment/store", Some(body)).await;
    assert_eq!(status_code, axum::http::StatusCode::OK);
    assert_eq!(response["type_id"], 2);
}

#[tokio::test]
async fn test_callback_with_malformed_reference_still_recorded() {
    let state = create_test_app_state();

    let (status_code, body) = request_json(
        app(state.clone()),
        "POST",
        "/payment/store",
        Some(callback_body("ORD-CB-5", "garbage-reference", 0)),
    )
    .await;

    // Money moved; the row is kept even without attribution
    assert_eq!(status_code, axum::http::StatusCode::OK);
    assert!(body["user_id"].is_null());
    assert!(body["cart_id"].is_null());
    assert!(body["donation_id"].is_null());

    let conn = state.db.get().unwrap();
    assert!(queries::get_payment_by_order_number(&conn, "ORD-CB-5")
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_payment_lookup_endpoints() {
    let state = create_test_app_state();
    {
        let conn = state.db.get().unwrap();
        let type_id = mobile_money_type_id(&conn);
        queries::upsert_payment(&conn, &test_upsert_payment("ORD-LOOK-1", 750.0, type_id)).unwrap();
    }

    let (status_code, body) = request_json(
        app(state.clone()),
        "GET",
        "/payments/order/ORD-LOOK-1",
        None,
    )
    .await;
    assert_eq!(status_code, axum::http::StatusCode::OK);
    assert_eq!(body["amount"], 750.0);

    let (status_code, _) = request_json(
        app(state.clone()),
        "GET",
        "/payments/order/ORD-MISSING",
        None,
    )
    .await;
    assert_eq!(status_code, axum::http::StatusCode::NOT_FOUND);

    let (status_code, body) = request_json(
        app(state),
        "GET",
        "/payments/phone/%2B243820000001",
        None,
    )
    .await;
    assert_eq!(status_code, axum::http::StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_switch_status_rejects_unknown_status() {
    let state = create_test_app_state();
    let payment_id = {
        let conn = state.db.get().unwrap();
        let type_id = mobile_money_type_id(&conn);
        queries::upsert_payment(&conn, &test_upsert_payment("ORD-SW-1", 100.0, type_id))
            .unwrap()
            .id
    };

    let (status_code, _) = request_json(
        app(state.clone()),
        "POST",
        &format!("/payments/{}/switch_status", payment_id),
        Some(json!({ "status_id": 42 })),
    )
    .await;
    assert_eq!(status_code, axum::http::StatusCode::BAD_REQUEST);

    let (status_code, body) = request_json(
        app(state),
        "POST",
        &format!("/payments/{}/switch_status", payment_id),
        Some(json!({ "status_id": status::COMPLETED })),
    )
    .await;
    assert_eq!(status_code, axum::http::StatusCode::OK);
    assert_eq!(body["status_id"], status::COMPLETED);
}
