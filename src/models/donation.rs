use serde::{Deserialize, Serialize};

/// A donation, created only after the gateway accepted the payment attempt.
/// `user_id` is nullable: anonymous donations are allowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donation {
    pub id: i64,
    pub amount: f64,
    pub currency: String,
    pub pricing_id: Option<i64>,
    pub user_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateDonation {
    pub amount: f64,
    pub currency: String,
    #[serde(default)]
    pub pricing_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateDonation {
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub pricing_id: Option<i64>,
    pub user_id: Option<i64>,
}
