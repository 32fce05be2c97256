mod books;
mod carts;
mod donations;
mod media;
mod notifications;
mod payments;
mod sessions;
mod users;

pub use books::*;
pub use carts::*;
pub use donations::*;
pub use media::*;
pub use notifications::*;
pub use payments::*;
pub use sessions::*;
pub use users::*;

use axum::{
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;

use crate::db::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        // donations
        .route("/donation", post(initiate_donation))
        .route("/donations", get(list_donations))
        .route("/donations/{id}", get(get_donation))
        .route("/donations/{id}", put(update_donation))
        .route("/donations/{id}", delete(delete_donation))
        // payments
        .route("/payment/store", post(store_payment))
        .route("/payments", get(list_payments))
        .route("/payments/{id}", get(get_payment))
        .route("/payments/phone/{phone}", get(find_payments_by_phone))
        .route("/payments/order/{order_number}", get(find_payment_by_order_number))
        .route(
            "/payments/order/{order_number}/user/{user_id}",
            get(find_payment_by_order_number_and_user),
        )
        .route("/payments/{id}/switch_status", post(switch_payment_status))
        // carts
        .route("/cart/find_by_type/{user_id}/{type_id}", get(find_cart_by_type))
        .route("/carts/{id}", get(get_cart))
        .route("/carts/{id}/orders", get(list_cart_orders))
        .route("/carts/{id}/orders", post(add_cart_order))
        .route("/orders/{id}", delete(remove_cart_order))
        .route("/cart/is_in_cart", get(is_in_cart))
        // users
        .route("/users", get(list_users))
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}", put(update_user))
        .route("/users/{id}", delete(delete_user))
        // media
        .route("/media", get(list_media))
        .route("/media", post(create_media))
        .route("/media/{id}", get(show_media))
        .route("/media/{id}", put(update_media))
        .route("/media/{id}", delete(delete_media))
        .route("/media/{id}/like", post(like_media))
        .route("/media/{id}/like", delete(unlike_media))
        // books
        .route("/books", get(list_books))
        .route("/books", post(create_book))
        .route("/books/{id}", get(get_book))
        .route("/books/{id}", put(update_book))
        .route("/books/{id}", delete(delete_book))
        // sessions
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session))
        .route("/sessions/{id}", delete(delete_session))
        .route("/sessions/{id}/user", put(link_session_user))
        // notifications
        .route("/users/{id}/notifications", get(list_user_notifications))
        .route("/notifications/{id}/read", post(mark_notification_read))
}
