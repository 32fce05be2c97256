use serde::{Deserialize, Serialize};

/// A visitor session. Anonymous at first; `user_id` is linked on login so
/// engagement (views, likes) recorded before authentication is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Random opaque token, client-held.
    pub id: String,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub user_id: Option<i64>,
    pub created_at: i64,
    pub last_activity: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateSession {
    /// Client may supply its own token; one is generated otherwise.
    #[serde(default)]
    pub id: Option<String>,
    pub ip_address: String,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
}
