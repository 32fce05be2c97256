use serde::{Deserialize, Serialize};

/// Cart type configuration row. `basket` is an ordinary checkout cart;
/// `watchlist` marks a saved-for-later list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartType {
    pub id: i64,
    pub name: String,
}

pub const CART_TYPE_BASKET: &str = "basket";
pub const CART_TYPE_WATCHLIST: &str = "watchlist";

/// One cart per (user, type) pair, lazily created on first touch.
///
/// `payment_code` is a rotating anti-replay token: it is regenerated every
/// time a completed payment references this cart, so a client can tell
/// whether the cart has been paid since it last saw the code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: i64,
    pub payment_code: Option<String>,
    pub type_id: i64,
    pub status_id: Option<i64>,
    pub user_id: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Line item inside a cart: exactly one of media_id / book_id is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub cart_id: i64,
    pub media_id: Option<i64>,
    pub book_id: Option<i64>,
    pub pricing_id: Option<i64>,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrder {
    #[serde(default)]
    pub media_id: Option<i64>,
    #[serde(default)]
    pub book_id: Option<i64>,
    #[serde(default)]
    pub pricing_id: Option<i64>,
}
