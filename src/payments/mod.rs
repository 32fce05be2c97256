//! Payment gateway integration.
//!
//! The gateway exposes two initiation flows: mobile money, which pushes a
//! debit prompt to the customer's handset, and bank card, which returns a
//! hosted redirect URL. Both are fronted by [`flexpay::FlexPayClient`].

pub mod flexpay;

use serde::{Deserialize, Serialize};

use crate::models::{TRANSACTION_TYPE_BANK_CARD, TRANSACTION_TYPE_MOBILE_MONEY};

/// Transaction channel selected by the client at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    MobileMoney,
    BankCard,
}

impl TransactionKind {
    /// Name of the matching row in transaction_types.
    pub fn type_name(&self) -> &'static str {
        match self {
            TransactionKind::MobileMoney => TRANSACTION_TYPE_MOBILE_MONEY,
            TransactionKind::BankCard => TRANSACTION_TYPE_BANK_CARD,
        }
    }
}

/// Payment lifecycle states stored in payments.status_id.
pub mod status {
    /// Accepted by the gateway, final settlement pending.
    pub const PENDING: i64 = 1;
    /// Confirmed settled by a gateway callback.
    pub const COMPLETED: i64 = 2;
    /// Declined or reversed.
    pub const FAILED: i64 = 3;
}
