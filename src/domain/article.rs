use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::ParsedArticle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    /// Owning feed. Lookup only; the feed owns the article, not the reverse.
    pub feed_id: i64,
    pub title: String,
    pub link: String,
    pub description: String,
    pub content: Option<String>,
    pub author: String,
    pub published_at: DateTime<Utc>,
    pub guid: String,
    pub is_read: bool,
    pub is_starred: bool,
    pub image_url: Option<String>,
}

impl Article {
    pub fn new(feed_id: i64, guid: String, title: String, link: String) -> Self {
        Self {
            id: 0,
            feed_id,
            title,
            link,
            description: String::new(),
            content: None,
            author: String::new(),
            published_at: Utc::now(),
            guid,
            is_read: false,
            is_starred: false,
            image_url: None,
        }
    }

    /// Build an unsaved article from a parsed item. Returns `None` when the
    /// item has no link.
    pub fn from_parsed(feed_id: i64, parsed: &ParsedArticle) -> Option<Self> {
        let link = parsed.link.as_deref()?.trim();
        if link.is_empty() {
            return None;
        }

        let mut article = Self::new(
            feed_id,
            parsed.guid.clone(),
            parsed.title.clone(),
            link.to_string(),
        );
        article.description = parsed.description.clone();
        article.content = (!parsed.content.is_empty()).then(|| parsed.content.clone());
        article.author = parsed.author.clone();
        article.published_at = parsed.published_at;
        article.image_url = parsed.image_url.clone();
        Some(article)
    }

    /// Deterministic guid for entries whose feed supplies none.
    pub fn synthesize_guid(link: Option<&str>, title: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(link.unwrap_or("").as_bytes());
        hasher.update(b"|");
        hasher.update(title.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Best available body for display
    pub fn display_content(&self) -> &str {
        self.content.as_deref().unwrap_or(&self.description)
    }
}
