//! Outbound SMS notifications.
//!
//! When no SMS credentials are configured the service runs in log-only
//! mode: messages are written to the log instead of being sent, which is
//! what local development and tests rely on.

use serde::Serialize;

use crate::config::SmsConfig;
use crate::error::Result;

#[derive(Debug, Serialize)]
struct SmsRequest<'a> {
    sender: &'a str,
    recipient: &'a str,
    message: &'a str,
}

/// SMS delivery service. Shared via `Arc` in application state.
#[derive(Debug)]
pub struct SmsService {
    config: Option<SmsConfig>,
    http: reqwest::Client,
}

impl SmsService {
    pub fn new(config: Option<SmsConfig>) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Send a message to a phone number. Returns Ok(false) in log-only mode.
    pub async fn send(&self, recipient: &str, message: &str) -> Result<bool> {
        let Some(config) = &self.config else {
            tracing::info!(recipient, message, "sms disabled, logging only");
            return Ok(false);
        };
        let body = SmsRequest {
            sender: &config.sender,
            recipient,
            message,
        };
        self.http
            .post(&config.api_url)
            .bearer_auth(&config.api_token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        tracing::info!(recipient, "sms sent");
        Ok(true)
    }

    /// Notify a donor that their donation was received. Delivery failures
    /// are logged and swallowed: the donation is already durable and a
    /// missed text must not fail the request.
    pub async fn notify_donation(&self, phone: &str, amount: f64, currency: &str) -> bool {
        let message = format!(
            "Thank you for your donation of {} {}. Your support keeps DikiTivi running.",
            amount, currency
        );
        match self.send(phone, &message).await {
            Ok(sent) => sent,
            Err(err) => {
                tracing::warn!(phone, error = %err, "donation sms failed");
                false
            }
        }
    }
}
