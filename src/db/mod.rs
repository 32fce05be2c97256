mod from_row;
mod schema;
pub mod queries;

pub use schema::{init_db, seed_config_rows};

use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::config::GatewayConfig;
use crate::sms::SmsService;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state holding the database pool and external service clients.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    /// Base URL for gateway callbacks (e.g., https://api.dikitivi.com)
    pub base_url: String,
    /// FlexPay credentials and endpoints, injected at startup.
    pub gateway: GatewayConfig,
    pub sms: Arc<SmsService>,
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path);
    Pool::builder().max_size(10).build(manager)
}
