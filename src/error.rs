use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The payment gateway rejected the request (non-zero code).
    /// Carries the gateway's human-readable message; no local state is mutated.
    #[error("Gateway rejected: {0}")]
    GatewayRejected(String),

    /// A transport/protocol failure talking to an external provider.
    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Common error message constants so handlers stay consistent.
pub mod msg {
    pub const USER_NOT_FOUND: &str = "User not found";
    pub const MEDIA_NOT_FOUND: &str = "Media not found";
    pub const BOOK_NOT_FOUND: &str = "Book not found";
    pub const CART_NOT_FOUND: &str = "Cart not found";
    pub const CART_TYPE_NOT_FOUND: &str = "Cart type not found";
    pub const ORDER_NOT_FOUND: &str = "Order not found";
    pub const DONATION_NOT_FOUND: &str = "Donation not found";
    pub const PAYMENT_NOT_FOUND: &str = "Payment not found";
    pub const SESSION_NOT_FOUND: &str = "Session not found";
    pub const NOTIFICATION_NOT_FOUND: &str = "Notification not found";
    pub const TRANSACTION_TYPE_NOT_FOUND: &str = "Transaction type not configured";
}

/// Extension trait for turning `Option<T>` lookups into 404 errors.
pub trait OptionExt<T> {
    fn or_not_found(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, message: &str) -> Result<T> {
        self.ok_or_else(|| AppError::NotFound(message.to_string()))
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        // Uniqueness violations are caller errors (duplicate email, replayed
        // external id), not server faults.
        match &e {
            rusqlite::Error::SqliteFailure(err, message)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                AppError::Conflict(
                    message
                        .clone()
                        .unwrap_or_else(|| "constraint violation".to_string()),
                )
            }
            _ => AppError::Database(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Gateway(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone()))
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "Conflict", Some(msg.clone())),
            AppError::GatewayRejected(msg) => (
                StatusCode::BAD_REQUEST,
                "Payment rejected",
                Some(msg.clone()),
            ),
            AppError::Gateway(e) => {
                tracing::error!("Gateway transport error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Payment gateway unavailable",
                    None,
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
            AppError::Json(e) => {
                tracing::error!("JSON error: {}", e);
                (StatusCode::BAD_REQUEST, "Invalid JSON", Some(e.to_string()))
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
