use serde::{Deserialize, Serialize};

/// A payment attempt reconciled against the gateway.
///
/// `order_number` is the gateway-assigned external identity and is unique:
/// a second callback for the same order number updates the existing row.
/// `reference` is our locally generated idempotency/attribution token.
/// A payment references either a cart (checkout) or a donation, never both
/// in practice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub reference: String,
    pub provider_reference: Option<String>,
    pub order_number: String,
    pub amount: f64,
    pub amount_customer: Option<f64>,
    pub phone: Option<String>,
    pub currency: String,
    pub channel: Option<String>,
    pub type_id: i64,
    /// Lifecycle state, see `payments::status`.
    pub status_id: i64,
    pub cart_id: Option<i64>,
    pub donation_id: Option<i64>,
    pub user_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// All mutable payment fields, applied as one atomic upsert keyed by
/// `order_number`. Last payload wins on retry, except `donation_id`, which
/// is never cleared once set.
#[derive(Debug, Clone)]
pub struct UpsertPayment {
    pub reference: String,
    pub provider_reference: Option<String>,
    pub order_number: String,
    pub amount: f64,
    pub amount_customer: Option<f64>,
    pub phone: Option<String>,
    pub currency: String,
    pub channel: Option<String>,
    pub type_id: i64,
    pub status_id: i64,
    pub cart_id: Option<i64>,
    pub donation_id: Option<i64>,
    pub user_id: Option<i64>,
}
