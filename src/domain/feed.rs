use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::app::{ReadOneError, Result};

/// Proxy that returns full article text for a feed URL appended to it.
pub const DEFAULT_FULL_TEXT_PROXY: &str = "https://feedex.net/feed/";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    pub id: i64,
    pub title: String,
    /// Source URL as entered by the user. Never the proxy-rewritten URL.
    pub url: String,
    pub description: String,
    pub image_url: Option<String>,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub use_full_text: bool,
}

impl Feed {
    pub fn new(url: String, title: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            title,
            url,
            description: String::new(),
            image_url: None,
            last_updated: now,
            created_at: now,
            use_full_text: false,
        }
    }

    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.url
        } else {
            &self.title
        }
    }

    /// The URL to actually request for this feed.
    pub fn fetch_url(&self, proxy_base: &str) -> String {
        resolve_fetch_url(&self.url, self.use_full_text, proxy_base)
    }
}

/// Rewrite `url` through the full-text proxy when `use_full_text` is set.
pub fn resolve_fetch_url(url: &str, use_full_text: bool, proxy_base: &str) -> String {
    if use_full_text {
        format!("{}{}", proxy_base, url)
    } else {
        url.to_string()
    }
}

/// Clean up user input for a feed URL: trims it and assumes https when no
/// scheme is given. The result must parse as an http(s) URL with a host.
pub fn normalize_feed_url(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ReadOneError::InvalidUrl(input.to_string()));
    }

    let candidate = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    validate_http_url(&candidate)?;
    Ok(candidate)
}

pub(crate) fn validate_http_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url)?;
    match parsed.scheme() {
        "http" | "https" => {}
        _ => return Err(ReadOneError::InvalidUrl(url.to_string())),
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ReadOneError::InvalidUrl(url.to_string()));
    }
    Ok(parsed)
}

#[derive(Debug, Clone, Default)]
pub struct FeedUpdate {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub use_full_text: Option<bool>,
    pub last_updated: Option<DateTime<Utc>>,
}
