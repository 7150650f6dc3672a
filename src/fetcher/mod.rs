pub mod http_fetcher;
pub mod parallel;

use async_trait::async_trait;

use crate::app::Result;

#[async_trait]
pub trait Fetcher {
    /// GET `url` and return the response body. Transport failures and
    /// non-success statuses are errors; an empty body is returned as-is.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
