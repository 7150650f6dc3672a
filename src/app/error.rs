use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadOneError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("No data received")]
    NoData,

    #[error("Feed parsing error: {0}")]
    Parse(#[source] feed_rs::parser::ParseFeedError),

    #[error("Unsupported feed format")]
    UnsupportedFeed,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Feed not found: {0}")]
    FeedNotFound(String),

    #[error("Feed already exists: {0}")]
    FeedExists(String),

    #[error("Article not found: {0}")]
    ArticleNotFound(i64),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReadOneError {
    /// Whether this error came out of fetching or parsing a feed, as opposed
    /// to local storage or configuration.
    pub fn is_ingestion(&self) -> bool {
        matches!(
            self,
            ReadOneError::InvalidUrl(_)
                | ReadOneError::Network(_)
                | ReadOneError::NoData
                | ReadOneError::Parse(_)
                | ReadOneError::UnsupportedFeed
        )
    }
}

impl From<url::ParseError> for ReadOneError {
    fn from(e: url::ParseError) -> Self {
        ReadOneError::InvalidUrl(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReadOneError>;
