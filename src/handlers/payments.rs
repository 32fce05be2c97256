use axum::extract::State;
use serde::Deserialize;

use crate::db::{queries, AppState};
use crate::error::{msg, AppError, OptionExt, Result};
use crate::extractors::{Json, Path};
use crate::models::{Payment, UpsertPayment, TRANSACTION_TYPE_MOBILE_MONEY};
use crate::payments::status;
use crate::reference;

// The gateway sends the type field as either a string or a bare number.
fn de_opt_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!("unexpected type value: {}", other))),
    }
}

/// Resolve the wire `type` to a transaction_types row id. Settlement
/// callbacks must never be dropped over an unknown label, so anything that
/// does not match by name or numeric id falls back to the default type.
fn resolve_transaction_type(conn: &rusqlite::Connection, raw: Option<&str>) -> Result<i64> {
    if let Some(raw) = raw {
        if let Some(t) = queries::get_transaction_type_by_name(conn, raw)? {
            return Ok(t.id);
        }
        if let Ok(id) = raw.parse::<i64>() {
            if queries::get_transaction_type_by_id(conn, id)?.is_some() {
                return Ok(id);
            }
        }
        tracing::warn!(raw, "unknown transaction type in callback, using default");
    }
    let default = queries::get_transaction_type_by_name(conn, TRANSACTION_TYPE_MOBILE_MONEY)?
        .or_not_found(msg::TRANSACTION_TYPE_NOT_FOUND)?;
    Ok(default.id)
}

/// Gateway callback payload. Field names follow the provider's wire format.
#[derive(Debug, Deserialize)]
pub struct StorePaymentRequest {
    pub code: i64,
    pub reference: String,
    #[serde(rename = "orderNumber")]
    pub order_number: String,
    pub amount: f64,
    #[serde(default, rename = "amountCustomer")]
    pub amount_customer: Option<f64>,
    #[serde(default)]
    pub phone: Option<String>,
    pub currency: String,
    #[serde(default)]
    pub channel: Option<String>,
    /// Transaction type as sent by the gateway: a name, a numeric code,
    /// or absent.
    #[serde(default, rename = "type", deserialize_with = "de_opt_string")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub provider_reference: Option<String>,
}

/// Record a gateway callback against the payments table.
///
/// Idempotent on `orderNumber`: retried or duplicated callbacks update the
/// existing row instead of inserting a second one. A reference that fails to
/// decode still records the payment, just without cart/donation/user links.
pub async fn store_payment(
    State(state): State<AppState>,
    Json(request): Json<StorePaymentRequest>,
) -> Result<Json<Payment>> {
    let conn = state.db.get()?;

    let parts = reference::decode(&request.reference);
    let user_id = parts.user.id();
    let cart_id = parts.cart.id();
    let donation_id = parts.donation.id();

    let type_id = resolve_transaction_type(&conn, request.type_name.as_deref())?;

    let status_id = if request.code == 0 {
        status::COMPLETED
    } else {
        status::FAILED
    };

    let payment = queries::upsert_payment(
        &conn,
        &UpsertPayment {
            reference: request.reference.clone(),
            provider_reference: request.provider_reference.clone(),
            order_number: request.order_number.clone(),
            amount: request.amount,
            amount_customer: request.amount_customer,
            phone: request.phone.clone(),
            currency: request.currency.clone(),
            channel: request.channel.clone(),
            type_id,
            status_id,
            cart_id,
            donation_id,
            user_id,
        },
    )?;

    if payment.status_id == status::COMPLETED {
        if let Some(user_id) = payment.user_id {
            queries::create_notification(
                &conn,
                &crate::models::CreateNotification {
                    user_id,
                    subject: Some("Payment confirmed".to_string()),
                    body: format!(
                        "Your payment {} of {} {} was confirmed.",
                        payment.order_number, payment.amount, payment.currency
                    ),
                },
            )?;
        }
    }

    // A settled cart gets a fresh payment code so the old one cannot be
    // replayed at checkout.
    if let Some(cart_id) = cart_id {
        if !queries::rotate_cart_payment_code(&conn, cart_id)? {
            tracing::warn!(cart_id, order_number = %request.order_number, "callback referenced unknown cart");
        }
    }

    tracing::info!(
        order_number = %request.order_number,
        code = request.code,
        status_id,
        "payment callback recorded"
    );
    Ok(Json(payment))
}

pub async fn list_payments(State(state): State<AppState>) -> Result<Json<Vec<Payment>>> {
    let conn = state.db.get()?;
    Ok(Json(queries::list_payments(&conn)?))
}

pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Payment>> {
    let conn = state.db.get()?;
    let payment = queries::get_payment_by_id(&conn, id)?.or_not_found(msg::PAYMENT_NOT_FOUND)?;
    Ok(Json(payment))
}

pub async fn find_payments_by_phone(
    State(state): State<AppState>,
    Path(phone): Path<String>,
) -> Result<Json<Vec<Payment>>> {
    let conn = state.db.get()?;
    Ok(Json(queries::list_payments_by_phone(&conn, &phone)?))
}

pub async fn find_payment_by_order_number(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<Json<Payment>> {
    let conn = state.db.get()?;
    let payment = queries::get_payment_by_order_number(&conn, &order_number)?
        .or_not_found(msg::PAYMENT_NOT_FOUND)?;
    Ok(Json(payment))
}

#[derive(Debug, Deserialize)]
pub struct OrderNumberUserPath {
    pub order_number: String,
    pub user_id: i64,
}

pub async fn find_payment_by_order_number_and_user(
    State(state): State<AppState>,
    Path(path): Path<OrderNumberUserPath>,
) -> Result<Json<Payment>> {
    let conn = state.db.get()?;
    let payment =
        queries::get_payment_by_order_number_and_user(&conn, &path.order_number, path.user_id)?
            .or_not_found(msg::PAYMENT_NOT_FOUND)?;
    Ok(Json(payment))
}

#[derive(Debug, Deserialize)]
pub struct SwitchStatusRequest {
    pub status_id: i64,
}

pub async fn switch_payment_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<SwitchStatusRequest>,
) -> Result<Json<Payment>> {
    if !matches!(
        request.status_id,
        status::PENDING | status::COMPLETED | status::FAILED
    ) {
        return Err(AppError::BadRequest("unknown status_id".into()));
    }
    let conn = state.db.get()?;
    let payment = queries::set_payment_status(&conn, id, request.status_id)?
        .or_not_found(msg::PAYMENT_NOT_FOUND)?;
    Ok(Json(payment))
}
