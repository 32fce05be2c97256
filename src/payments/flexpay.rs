//! HTTP client for the FlexPay payment gateway.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::GatewayConfig;
use crate::error::{AppError, Result};

/// Upstream timeout for gateway calls. A stalled gateway must not pin a
/// request handler indefinitely.
const GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

/// Response to a mobile money initiation.
///
/// `code == 0` means the gateway accepted the transaction for processing;
/// any other value is a rejection and `message` carries the reason.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayResponse {
    #[serde(deserialize_with = "de_code")]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "orderNumber")]
    pub order_number: Option<String>,
}

impl GatewayResponse {
    pub fn is_accepted(&self) -> bool {
        self.code == 0
    }
}

/// Response to a card initiation. Carries the hosted checkout URL the
/// client must be redirected to.
#[derive(Debug, Clone, Deserialize)]
pub struct CardGatewayResponse {
    #[serde(deserialize_with = "de_code")]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "orderNumber")]
    pub order_number: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl CardGatewayResponse {
    pub fn is_accepted(&self) -> bool {
        self.code == 0
    }
}

// The gateway is inconsistent about the code field: sometimes a JSON
// number, sometimes a quoted string.
fn de_code<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| D::Error::custom("non-integer code")),
        Value::String(s) => s
            .parse()
            .map_err(|_| D::Error::custom("non-numeric code string")),
        other => Err(D::Error::custom(format!(
            "unexpected code value: {}",
            other
        ))),
    }
}

#[derive(Debug, Serialize)]
struct MobileMoneyRequest<'a> {
    merchant: &'a str,
    #[serde(rename = "type")]
    kind: u8,
    reference: &'a str,
    phone: &'a str,
    amount: String,
    currency: &'a str,
    callback_url: &'a str,
}

#[derive(Debug, Serialize)]
struct CardRequest<'a> {
    merchant: &'a str,
    reference: &'a str,
    amount: String,
    currency: &'a str,
    description: &'a str,
    callback_url: &'a str,
    approve_url: &'a str,
    cancel_url: &'a str,
    decline_url: &'a str,
}

/// Client for the FlexPay initiation endpoints. Cheap to clone.
#[derive(Debug, Clone)]
pub struct FlexPayClient {
    http: reqwest::Client,
    mobile_url: String,
    card_url: String,
    merchant: String,
    api_token: String,
}

impl FlexPayClient {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(GATEWAY_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            mobile_url: config.mobile_url.clone(),
            card_url: config.card_url.clone(),
            merchant: config.merchant.clone(),
            api_token: config.api_token.clone(),
        })
    }

    /// Initiate a mobile money debit. The customer receives a prompt on
    /// their handset; settlement is confirmed later via callback.
    pub async fn init_mobile_money(
        &self,
        reference: &str,
        phone: &str,
        amount: f64,
        currency: &str,
        callback_url: &str,
    ) -> Result<GatewayResponse> {
        let body = MobileMoneyRequest {
            merchant: &self.merchant,
            kind: 1,
            reference,
            phone,
            amount: format_amount(amount),
            currency,
            callback_url,
        };
        tracing::info!(reference, phone, amount, currency, "gateway mobile money init");
        let response: GatewayResponse = self
            .http
            .post(&self.mobile_url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;
        tracing::info!(
            reference,
            code = response.code,
            order_number = response.order_number.as_deref(),
            "gateway mobile money response"
        );
        Ok(response)
    }

    /// Initiate a card payment. On acceptance the response carries the
    /// hosted checkout URL.
    #[allow(clippy::too_many_arguments)]
    pub async fn init_card(
        &self,
        reference: &str,
        amount: f64,
        currency: &str,
        description: &str,
        callback_url: &str,
        approve_url: &str,
        cancel_url: &str,
        decline_url: &str,
    ) -> Result<CardGatewayResponse> {
        let body = CardRequest {
            merchant: &self.merchant,
            reference,
            amount: format_amount(amount),
            currency,
            description,
            callback_url,
            approve_url,
            cancel_url,
            decline_url,
        };
        tracing::info!(reference, amount, currency, "gateway card init");
        let response: CardGatewayResponse = self
            .http
            .post(&self.card_url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;
        tracing::info!(
            reference,
            code = response.code,
            order_number = response.order_number.as_deref(),
            "gateway card response"
        );
        Ok(response)
    }
}

/// Require an accepted gateway response, mapping rejection to a client error.
pub fn require_accepted(code: i64, message: &str) -> Result<()> {
    if code == 0 {
        Ok(())
    } else {
        Err(AppError::GatewayRejected(if message.is_empty() {
            format!("gateway declined with code {}", code)
        } else {
            message.to_string()
        }))
    }
}

// The gateway rejects amounts with trailing fractional zeros, so whole
// values go out as integers.
fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{}", amount as i64)
    } else {
        format!("{}", amount)
    }
}
