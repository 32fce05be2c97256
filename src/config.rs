use std::env;

/// Credentials and endpoints for the FlexPay payment gateway.
///
/// Injected into `FlexPayClient` rather than read from ambient globals so
/// tests can point the client at a mock server.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub mobile_url: String,
    pub card_url: String,
    pub merchant: String,
    pub api_token: String,
}

/// Credentials for the SMS provider.
#[derive(Debug, Clone)]
pub struct SmsConfig {
    pub api_url: String,
    pub api_token: String,
    pub sender: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub base_url: String,
    pub gateway: GatewayConfig,
    pub sms: Option<SmsConfig>,
    pub dev_mode: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("DIKITIVI_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", host, port));

        let gateway = GatewayConfig {
            mobile_url: env::var("FLEXPAY_GATEWAY_MOBILE")
                .unwrap_or_else(|_| "https://backend.flexpay.cd/api/rest/v1/paymentService".into()),
            card_url: env::var("FLEXPAY_GATEWAY_CARD")
                .unwrap_or_else(|_| "https://cardpayment.flexpay.cd/v1.1/pay".into()),
            merchant: env::var("FLEXPAY_MERCHANT").unwrap_or_default(),
            api_token: env::var("FLEXPAY_API_TOKEN").unwrap_or_default(),
        };

        // SMS is optional: without credentials, notifications are logged only.
        let sms = match (env::var("SMS_API_URL"), env::var("SMS_API_TOKEN")) {
            (Ok(api_url), Ok(api_token)) => Some(SmsConfig {
                api_url,
                api_token,
                sender: env::var("SMS_SENDER").unwrap_or_else(|_| "DikiTivi".into()),
            }),
            _ => None,
        };

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "dikitivi.db".to_string()),
            base_url,
            gateway,
            sms,
            dev_mode,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
