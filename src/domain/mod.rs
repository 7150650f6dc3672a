pub mod article;
pub mod feed;
pub mod parsed;

pub use article::Article;
pub use feed::{normalize_feed_url, resolve_fetch_url, Feed, FeedUpdate, DEFAULT_FULL_TEXT_PROXY};
pub use parsed::{ParsedArticle, ParsedFeed};
