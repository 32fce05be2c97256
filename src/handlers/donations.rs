use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::db::{queries, AppState};
use crate::error::{msg, AppError, OptionExt, Result};
use crate::extractors::{Json, Path};
use crate::models::{CreateDonation, Donation, UpdateDonation};
use crate::payments::flexpay::{require_accepted, FlexPayClient};
use crate::payments::{status, TransactionKind};
use crate::reference;

#[derive(Debug, Deserialize)]
pub struct DonationRequest {
    pub amount: f64,
    pub currency: String,
    /// Phone debited for mobile money; also the SMS recipient.
    pub phone: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default = "default_kind")]
    pub kind: TransactionKind,
    /// Card flow only: shown on the hosted checkout page.
    #[serde(default)]
    pub description: Option<String>,
}

fn default_kind() -> TransactionKind {
    TransactionKind::MobileMoney
}

#[derive(Debug, Serialize)]
pub struct DonationResponse {
    pub message: String,
    pub order_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub donation: Donation,
    pub notified: bool,
}

/// Initiate a donation through the payment gateway.
///
/// Nothing is written until the gateway accepts: a rejection leaves the
/// database untouched and surfaces the gateway's own message. On acceptance
/// one Donation and one pending Payment row are recorded, keyed by the
/// gateway order number.
pub async fn initiate_donation(
    State(state): State<AppState>,
    Json(request): Json<DonationRequest>,
) -> Result<Json<DonationResponse>> {
    if request.amount <= 0.0 {
        return Err(AppError::BadRequest("amount must be positive".into()));
    }
    if request.phone.trim().is_empty() {
        return Err(AppError::BadRequest("phone is required".into()));
    }

    // Validate against the db, then release the connection for the
    // duration of the gateway call.
    let transaction_type = {
        let conn = state.db.get()?;
        let transaction_type =
            queries::get_transaction_type_by_name(&conn, request.kind.type_name())?
                .or_not_found(msg::TRANSACTION_TYPE_NOT_FOUND)?;
        if let Some(user_id) = request.user_id {
            queries::get_user_by_id(&conn, user_id)?.or_not_found(msg::USER_NOT_FOUND)?;
        }
        transaction_type
    };

    let reference = reference::encode(request.user_id, None, None);
    let callback_url = format!("{}/payment/store", state.base_url);

    let client = FlexPayClient::new(&state.gateway)?;
    let (code, message, order_number, url) = match request.kind {
        TransactionKind::MobileMoney => {
            let response = client
                .init_mobile_money(
                    &reference,
                    &request.phone,
                    request.amount,
                    &request.currency,
                    &callback_url,
                )
                .await?;
            (response.code, response.message, response.order_number, None)
        }
        TransactionKind::BankCard => {
            let approve_url = format!("{}/donation/approve", state.base_url);
            let cancel_url = format!("{}/donation/cancel", state.base_url);
            let decline_url = format!("{}/donation/decline", state.base_url);
            let response = client
                .init_card(
                    &reference,
                    request.amount,
                    &request.currency,
                    request.description.as_deref().unwrap_or("Donation"),
                    &callback_url,
                    &approve_url,
                    &cancel_url,
                    &decline_url,
                )
                .await?;
            (response.code, response.message, response.order_number, response.url)
        }
    };

    require_accepted(code, &message)?;
    let order_number =
        order_number.ok_or_else(|| AppError::Internal("gateway accepted without order number".into()))?;

    let conn = state.db.get()?;
    let donation = queries::create_donation(
        &conn,
        &CreateDonation {
            amount: request.amount,
            currency: request.currency.clone(),
            pricing_id: None,
            user_id: request.user_id,
        },
    )?;

    queries::upsert_payment(
        &conn,
        &crate::models::UpsertPayment {
            reference: reference.clone(),
            provider_reference: None,
            order_number: order_number.clone(),
            amount: request.amount,
            amount_customer: None,
            phone: Some(request.phone.clone()),
            currency: request.currency.clone(),
            channel: None,
            type_id: transaction_type.id,
            status_id: status::PENDING,
            cart_id: None,
            donation_id: Some(donation.id),
            user_id: request.user_id,
        },
    )?;
    drop(conn);

    // The donation is durable at this point, so a failed text only costs
    // the courtesy message.
    let notified = state
        .sms
        .notify_donation(&request.phone, request.amount, &request.currency)
        .await;

    Ok(Json(DonationResponse {
        message: "Donation initiated".into(),
        order_number,
        url,
        donation,
        notified,
    }))
}

pub async fn list_donations(State(state): State<AppState>) -> Result<Json<Vec<Donation>>> {
    let conn = state.db.get()?;
    Ok(Json(queries::list_donations(&conn)?))
}

pub async fn get_donation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Donation>> {
    let conn = state.db.get()?;
    let donation = queries::get_donation_by_id(&conn, id)?.or_not_found(msg::DONATION_NOT_FOUND)?;
    Ok(Json(donation))
}

pub async fn update_donation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateDonation>,
) -> Result<Json<Donation>> {
    let conn = state.db.get()?;
    // No-op update (all fields absent) falls back to returning the row as-is.
    let donation = match queries::update_donation(&conn, id, &input)? {
        Some(donation) => donation,
        None => queries::get_donation_by_id(&conn, id)?.or_not_found(msg::DONATION_NOT_FOUND)?,
    };
    Ok(Json(donation))
}

pub async fn delete_donation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    if !queries::delete_donation(&conn, id)? {
        return Err(AppError::NotFound(msg::DONATION_NOT_FOUND.into()));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
