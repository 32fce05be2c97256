use serde::{Deserialize, Serialize};

/// Payment method configuration row. The `mobile_money` and `bank_card`
/// rows must exist before the donation flow can run; their absence is a
/// deployment error, not a runtime fault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionType {
    pub id: i64,
    pub name: String,
}

pub const TRANSACTION_TYPE_MOBILE_MONEY: &str = "mobile_money";
pub const TRANSACTION_TYPE_BANK_CARD: &str = "bank_card";
