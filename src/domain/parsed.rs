use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result of one fetch-and-parse cycle. Not persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedFeed {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub articles: Vec<ParsedArticle>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParsedArticle {
    pub title: String,
    pub link: Option<String>,
    pub description: String,
    pub content: String,
    pub author: String,
    pub published_at: DateTime<Utc>,
    pub guid: String,
    pub image_url: Option<String>,
}
