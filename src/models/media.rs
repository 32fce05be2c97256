use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub media_url: Option<String>,
    pub cover_url: Option<String>,
    /// Suitable for underage viewers.
    pub for_youth: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Media plus engagement counters derived from sessions and likes.
#[derive(Debug, Clone, Serialize)]
pub struct MediaWithStats {
    #[serde(flatten)]
    pub media: Media,
    pub views: i64,
    pub likes: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateMedia {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub for_youth: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMedia {
    pub title: Option<String>,
    pub description: Option<String>,
    pub media_url: Option<String>,
    pub cover_url: Option<String>,
    pub for_youth: Option<bool>,
}
