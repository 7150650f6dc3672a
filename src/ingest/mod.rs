//! Feed ingestion: fetch a feed URL and normalize it into a [`ParsedFeed`].

use std::sync::Arc;

use crate::app::{ReadOneError, Result};
use crate::domain::feed::validate_http_url;
use crate::domain::{resolve_fetch_url, Feed, ParsedFeed};
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;

/// Stateless apart from the HTTP client; safe to share across tasks.
#[derive(Clone)]
pub struct Ingestor {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    normalizer: Normalizer,
    proxy_base: String,
}

impl Ingestor {
    pub fn new(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        normalizer: Normalizer,
        proxy_base: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            normalizer,
            proxy_base: proxy_base.into(),
        }
    }

    /// Fetch and parse `url` directly.
    pub async fn fetch_feed(&self, url: &str) -> Result<ParsedFeed> {
        self.fetch_resolved(url, url).await
    }

    /// Fetch `url`, going through the full-text proxy when `use_full_text` is
    /// set. The icon fallback still uses the host of `url`.
    pub async fn fetch_feed_for(&self, url: &str, use_full_text: bool) -> Result<ParsedFeed> {
        validate_http_url(url)?;
        let fetch_url = resolve_fetch_url(url, use_full_text, &self.proxy_base);
        self.fetch_resolved(&fetch_url, url).await
    }

    pub async fn fetch_stored(&self, feed: &Feed) -> Result<ParsedFeed> {
        validate_http_url(&feed.url)?;
        self.fetch_resolved(&feed.fetch_url(&self.proxy_base), &feed.url)
            .await
    }

    async fn fetch_resolved(&self, fetch_url: &str, source_url: &str) -> Result<ParsedFeed> {
        validate_http_url(fetch_url)?;

        let body = self.fetcher.fetch(fetch_url).await?;
        if body.is_empty() {
            return Err(ReadOneError::NoData);
        }

        let parsed = self.normalizer.normalize(source_url, &body)?;
        tracing::debug!(
            "Parsed {} items from {}",
            parsed.articles.len(),
            fetch_url
        );
        Ok(parsed)
    }
}
