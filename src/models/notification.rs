use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub subject: Option<String>,
    pub body: String,
    pub read: bool,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateNotification {
    pub user_id: i64,
    #[serde(default)]
    pub subject: Option<String>,
    pub body: String,
}
