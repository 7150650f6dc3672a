pub mod sqlite;

use crate::app::Result;
use crate::domain::{Article, Feed, FeedUpdate, ParsedFeed};
use crate::merge::MergeOutcome;

pub use sqlite::SqliteStore;

pub trait Store {
    // Feed operations
    fn add_feed(&self, feed: &Feed) -> Result<i64>;
    /// Create the feed and merge its first fetch in one transaction. Nothing
    /// is stored if either step fails.
    fn add_feed_with_articles(&self, feed: &Feed, parsed: &ParsedFeed)
        -> Result<(i64, MergeOutcome)>;
    fn get_feed(&self, id: i64) -> Result<Option<Feed>>;
    fn get_feed_by_url(&self, url: &str) -> Result<Option<Feed>>;
    fn get_all_feeds(&self) -> Result<Vec<Feed>>;
    fn update_feed(&self, id: i64, update: &FeedUpdate) -> Result<()>;
    /// Delete the feed together with every article it owns.
    fn delete_feed(&self, id: i64) -> Result<()>;

    // Merge
    /// Insert the parsed items whose guid is new for this feed and record
    /// the refresh time. Runs as a single transaction.
    fn merge_into_feed(&self, feed_id: i64, parsed: &ParsedFeed) -> Result<MergeOutcome>;

    // Article operations
    fn get_article(&self, id: i64) -> Result<Option<Article>>;
    /// Articles of one feed in insertion order.
    fn get_articles_by_feed(&self, feed_id: i64) -> Result<Vec<Article>>;
    /// All articles, newest published first.
    fn get_all_articles(&self) -> Result<Vec<Article>>;
    fn get_starred_articles(&self) -> Result<Vec<Article>>;
    fn search_articles(&self, query: &str) -> Result<Vec<Article>>;
    fn delete_article(&self, id: i64) -> Result<()>;

    // State operations
    fn set_read(&self, article_id: i64, is_read: bool) -> Result<()>;
    fn set_starred(&self, article_id: i64, is_starred: bool) -> Result<()>;
    fn mark_feed_read(&self, feed_id: i64) -> Result<usize>;
    fn get_unread_count(&self, feed_id: i64) -> Result<i64>;
}
