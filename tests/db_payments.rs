//! Tests for the payment upsert and lookup queries.

mod common;
use common::*;

#[test]
fn test_upsert_inserts_first_delivery() {
    let conn = setup_test_db();
    let type_id = mobile_money_type_id(&conn);

    let payment = queries::upsert_payment(&conn, &test_upsert_payment("ORD-1", 5000.0, type_id))
        .expect("upsert should succeed");

    assert_eq!(payment.order_number, "ORD-1");
    assert_eq!(payment.amount, 5000.0);
    assert_eq!(payment.status_id, status::PENDING);
}

#[test]
fn test_upsert_same_order_number_converges_to_one_row() {
    let conn = setup_test_db();
    let type_id = mobile_money_type_id(&conn);

    let first = queries::upsert_payment(&conn, &test_upsert_payment("ORD-2", 5000.0, type_id))
        .expect("first upsert should succeed");

    let mut second_input = test_upsert_payment("ORD-2", 5500.0, type_id);
    second_input.status_id = status::COMPLETED;
    let second = queries::upsert_payment(&conn, &second_input).expect("second upsert should succeed");

    // Same row, last payload wins
    assert_eq!(second.id, first.id);
    assert_eq!(second.amount, 5500.0);
    assert_eq!(second.status_id, status::COMPLETED);

    let all = queries::list_payments(&conn).expect("list should succeed");
    assert_eq!(all.len(), 1);
}

#[test]
fn test_upsert_preserves_donation_link() {
    let conn = setup_test_db();
    let type_id = mobile_money_type_id(&conn);
    let donation = queries::create_donation(
        &conn,
        &CreateDonation {
            amount: 5000.0,
            currency: "CDF".to_string(),
            pricing_id: None,
            user_id: None,
        },
    )
    .expect("create should succeed");

    // Initiation writes the link
    let mut initiation = test_upsert_payment("ORD-DON-1", 5000.0, type_id);
    initiation.donation_id = Some(donation.id);
    queries::upsert_payment(&conn, &initiation).expect("initiation upsert should succeed");

    // The settlement callback echoes a pre-donation reference, so its
    // payload carries no donation id
    let mut settlement = test_upsert_payment("ORD-DON-1", 5000.0, type_id);
    settlement.status_id = status::COMPLETED;
    let settled = queries::upsert_payment(&conn, &settlement).expect("settlement upsert should succeed");

    assert_eq!(settled.status_id, status::COMPLETED);
    assert_eq!(settled.donation_id, Some(donation.id));
}

#[test]
fn test_upsert_concurrent_same_order_number() {
    use std::sync::{Arc, Barrier};

    let num_threads = 5;
    let db_path = format!("/tmp/claude/test_payment_upsert_{}.db", uuid::Uuid::new_v4());
    std::fs::create_dir_all("/tmp/claude").expect("Failed to create tmp dir");

    let conn = rusqlite::Connection::open(&db_path).expect("Failed to create test db");
    init_db(&conn).expect("Failed to init schema");
    seed_config_rows(&conn).expect("Failed to seed config rows");
    let type_id = mobile_money_type_id(&conn);
    drop(conn);

    let barrier = Arc::new(Barrier::new(num_threads));
    let db_path_arc = Arc::new(db_path.clone());

    let handles: Vec<_> = (0..num_threads)
        .map(|i| {
            let barrier = Arc::clone(&barrier);
            let db_path = Arc::clone(&db_path_arc);
            std::thread::spawn(move || {
                let thread_conn = rusqlite::Connection::open(db_path.as_str())
                    .expect("thread failed to open db");
                thread_conn
                    .busy_timeout(std::time::Duration::from_secs(5))
                    .expect("failed to set busy timeout");

                barrier.wait();

                queries::upsert_payment(
                    &thread_conn,
                    &test_upsert_payment("ORD-RACE", 1000.0 + i as f64, type_id),
                )
                .expect("upsert should not error")
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let conn = rusqlite::Connection::open(&db_path).expect("Failed to reopen db");
    let payments = queries::list_payments(&conn).expect("list should succeed");
    assert_eq!(
        payments.len(),
        1,
        "{} concurrent upserts of one order number must leave one row",
        num_threads
    );

    let _ = std::fs::remove_file(&db_path);
}

#[test]
fn test_find_by_order_number_and_user() {
    let conn = setup_test_db();
    let type_id = mobile_money_type_id(&conn);
    let user = create_test_user(&conn, "Donor");

    let mut input = test_upsert_payment("ORD-3", 2000.0, type_id);
    input.user_id = Some(user.id);
    queries::upsert_payment(&conn, &input).expect("upsert should succeed");

    let found = queries::get_payment_by_order_number_and_user(&conn, "ORD-3", user.id)
        .expect("lookup should succeed");
    assert!(found.is_some());

    let miss = queries::get_payment_by_order_number_and_user(&conn, "ORD-3", user.id + 1)
        .expect("lookup should succeed");
    assert!(miss.is_none());
}

#[test]
fn test_list_payments_by_phone() {
    let conn = setup_test_db();
    let type_id = mobile_money_type_id(&conn);

    let mut first = test_upsert_payment("ORD-4", 100.0, type_id);
    first.phone = Some("+243111111111".to_string());
    queries::upsert_payment(&conn, &first).expect("upsert should succeed");

    let mut second = test_upsert_payment("ORD-5", 200.0, type_id);
    second.phone = Some("+243111111111".to_string());
    queries::upsert_payment(&conn, &second).expect("upsert should succeed");

    let mut other = test_upsert_payment("ORD-6", 300.0, type_id);
    other.phone = Some("+243222222222".to_string());
    queries::upsert_payment(&conn, &other).expect("upsert should succeed");

    let matches = queries::list_payments_by_phone(&conn, "+243111111111")
        .expect("list should succeed");
    assert_eq!(matches.len(), 2);
}

#[test]
fn test_set_payment_status() {
    let conn = setup_test_db();
    let type_id = mobile_money_type_id(&conn);

    let payment = queries::upsert_payment(&conn, &test_upsert_payment("ORD-7", 100.0, type_id))
        .expect("upsert should succeed");

    let updated = queries::set_payment_status(&conn, payment.id, status::COMPLETED)
        .expect("update should succeed")
        .expect("payment should exist");
    assert_eq!(updated.status_id, status::COMPLETED);

    let missing = queries::set_payment_status(&conn, payment.id + 99, status::FAILED)
        .expect("update should not error");
    assert!(missing.is_none());
}
