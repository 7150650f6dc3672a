use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::Client;

use crate::app::Result;
use crate::config::FetchConfig;
use crate::fetcher::Fetcher;

const FEED_ACCEPT: &str = "application/rss+xml, application/atom+xml, application/feed+json, application/xml;q=0.9, text/xml;q=0.9, */*;q=0.8";

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, HeaderValue::from_static(FEED_ACCEPT))
            .send()
            .await?;

        response.error_for_status_ref()?;

        let body = response.bytes().await?.to_vec();
        tracing::debug!("Fetched {} bytes from {}", body.len(), url);

        Ok(body)
    }
}
