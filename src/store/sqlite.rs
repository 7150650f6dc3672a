use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{ReadOneError, Result};
use crate::domain::{Article, Feed, FeedUpdate, ParsedFeed};
use crate::merge::{plan_merge, MergeOutcome};
use crate::store::Store;

const FEED_COLUMNS: &str =
    "id, url, title, description, image_url, use_full_text, last_updated, created_at";

const ARTICLE_COLUMNS: &str = "id, feed_id, guid, title, link, description, content, author, \
                               published_at, image_url, is_read, is_starred";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;

        conn.execute("PRAGMA foreign_keys = ON", [])?;
        migrations
            .to_latest(&mut conn)
            .map_err(|e| ReadOneError::Config(format!("Database migration failed: {}", e)))?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            ReadOneError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<DateTime<Utc>>().ok())
    }

    fn feed_from_row(row: &Row<'_>) -> rusqlite::Result<Feed> {
        Ok(Feed {
            id: row.get(0)?,
            url: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            image_url: row.get(4)?,
            use_full_text: row.get(5)?,
            last_updated: row
                .get::<_, String>(6)
                .ok()
                .and_then(|s| Self::parse_datetime(&s))
                .unwrap_or_else(Utc::now),
            created_at: row
                .get::<_, String>(7)
                .ok()
                .and_then(|s| Self::parse_datetime(&s))
                .unwrap_or_else(Utc::now),
        })
    }

    fn article_from_row(row: &Row<'_>) -> rusqlite::Result<Article> {
        Ok(Article {
            id: row.get(0)?,
            feed_id: row.get(1)?,
            guid: row.get(2)?,
            title: row.get(3)?,
            link: row.get(4)?,
            description: row.get(5)?,
            content: row.get(6)?,
            author: row.get(7)?,
            published_at: row
                .get::<_, String>(8)
                .ok()
                .and_then(|s| Self::parse_datetime(&s))
                .unwrap_or_else(Utc::now),
            image_url: row.get(9)?,
            is_read: row.get(10)?,
            is_starred: row.get(11)?,
        })
    }

    fn query_articles(&self, sql: &str, args: impl rusqlite::Params) -> Result<Vec<Article>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let articles = stmt
            .query_map(args, Self::article_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(articles)
    }
}

fn insert_feed(conn: &Connection, feed: &Feed) -> Result<i64> {
    conn.execute(
        "INSERT INTO feeds (url, title, description, image_url, use_full_text, last_updated, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            feed.url,
            feed.title,
            feed.description,
            feed.image_url,
            feed.use_full_text,
            feed.last_updated.to_rfc3339(),
            feed.created_at.to_rfc3339()
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

/// Insert the new articles of `parsed` and stamp the feed's refresh time.
/// Callers run this inside a transaction.
fn merge_articles(conn: &Connection, feed_id: i64, parsed: &ParsedFeed) -> Result<MergeOutcome> {
    let existing = conn
        .prepare("SELECT guid FROM articles WHERE feed_id = ?1")?
        .query_map(params![feed_id], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut outcome = plan_merge(feed_id, existing.iter().map(String::as_str), parsed);

    let mut insert = conn.prepare(
        "INSERT INTO articles (feed_id, guid, title, link, description, content, author, published_at, image_url)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;
    for article in &mut outcome.inserted {
        article.id = insert.insert(params![
            article.feed_id,
            article.guid,
            article.title,
            article.link,
            article.description,
            article.content,
            article.author,
            article.published_at.to_rfc3339(),
            article.image_url
        ])?;
    }

    conn.execute(
        "UPDATE feeds SET last_updated = ?1 WHERE id = ?2",
        params![outcome.refreshed_at.to_rfc3339(), feed_id],
    )?;

    Ok(outcome)
}

/// Escape LIKE wildcards so user input matches literally.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl Store for SqliteStore {
    fn add_feed(&self, feed: &Feed) -> Result<i64> {
        let conn = self.conn()?;
        insert_feed(&conn, feed)
    }

    fn add_feed_with_articles(
        &self,
        feed: &Feed,
        parsed: &ParsedFeed,
    ) -> Result<(i64, MergeOutcome)> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let feed_id = insert_feed(&tx, feed)?;
        let outcome = merge_articles(&tx, feed_id, parsed)?;

        tx.commit()?;
        Ok((feed_id, outcome))
    }

    fn get_feed(&self, id: i64) -> Result<Option<Feed>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                &format!("SELECT {} FROM feeds WHERE id = ?1", FEED_COLUMNS),
                params![id],
                Self::feed_from_row,
            )
            .optional()?;

        Ok(result)
    }

    fn get_feed_by_url(&self, url: &str) -> Result<Option<Feed>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                &format!("SELECT {} FROM feeds WHERE url = ?1", FEED_COLUMNS),
                params![url],
                Self::feed_from_row,
            )
            .optional()?;

        Ok(result)
    }

    fn get_all_feeds(&self) -> Result<Vec<Feed>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM feeds ORDER BY title COLLATE NOCASE, url",
            FEED_COLUMNS
        ))?;

        let feeds = stmt
            .query_map([], Self::feed_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(feeds)
    }

    fn update_feed(&self, id: i64, update: &FeedUpdate) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM feeds WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(ReadOneError::FeedNotFound(id.to_string()));
        }

        if let Some(ref title) = update.title {
            tx.execute("UPDATE feeds SET title = ?1 WHERE id = ?2", params![title, id])?;
        }
        if let Some(ref url) = update.url {
            tx.execute("UPDATE feeds SET url = ?1 WHERE id = ?2", params![url, id])?;
        }
        if let Some(ref description) = update.description {
            tx.execute(
                "UPDATE feeds SET description = ?1 WHERE id = ?2",
                params![description, id],
            )?;
        }
        if let Some(use_full_text) = update.use_full_text {
            tx.execute(
                "UPDATE feeds SET use_full_text = ?1 WHERE id = ?2",
                params![use_full_text, id],
            )?;
        }
        if let Some(ref last_updated) = update.last_updated {
            tx.execute(
                "UPDATE feeds SET last_updated = ?1 WHERE id = ?2",
                params![last_updated.to_rfc3339(), id],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_feed(&self, id: i64) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let articles = tx.execute("DELETE FROM articles WHERE feed_id = ?1", params![id])?;
        let feeds = tx.execute("DELETE FROM feeds WHERE id = ?1", params![id])?;
        if feeds == 0 {
            return Err(ReadOneError::FeedNotFound(id.to_string()));
        }

        tx.commit()?;
        tracing::debug!("Deleted feed {} and {} articles", id, articles);
        Ok(())
    }

    fn merge_into_feed(&self, feed_id: i64, parsed: &ParsedFeed) -> Result<MergeOutcome> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM feeds WHERE id = ?1)",
            params![feed_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(ReadOneError::FeedNotFound(feed_id.to_string()));
        }

        let outcome = merge_articles(&tx, feed_id, parsed)?;

        tx.commit()?;
        Ok(outcome)
    }

    fn get_article(&self, id: i64) -> Result<Option<Article>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                &format!("SELECT {} FROM articles WHERE id = ?1", ARTICLE_COLUMNS),
                params![id],
                Self::article_from_row,
            )
            .optional()?;

        Ok(result)
    }

    fn get_articles_by_feed(&self, feed_id: i64) -> Result<Vec<Article>> {
        self.query_articles(
            &format!(
                "SELECT {} FROM articles WHERE feed_id = ?1 ORDER BY id",
                ARTICLE_COLUMNS
            ),
            params![feed_id],
        )
    }

    fn get_all_articles(&self) -> Result<Vec<Article>> {
        self.query_articles(
            &format!(
                "SELECT {} FROM articles ORDER BY published_at DESC, id DESC",
                ARTICLE_COLUMNS
            ),
            params![],
        )
    }

    fn get_starred_articles(&self) -> Result<Vec<Article>> {
        self.query_articles(
            &format!(
                "SELECT {} FROM articles WHERE is_starred = 1 ORDER BY published_at DESC, id DESC",
                ARTICLE_COLUMNS
            ),
            params![],
        )
    }

    fn search_articles(&self, query: &str) -> Result<Vec<Article>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        self.query_articles(
            &format!(
                "SELECT {} FROM articles
                 WHERE title LIKE ?1 ESCAPE '\\'
                    OR description LIKE ?1 ESCAPE '\\'
                    OR content LIKE ?1 ESCAPE '\\'
                 ORDER BY published_at DESC, id DESC",
                ARTICLE_COLUMNS
            ),
            params![like_pattern(query)],
        )
    }

    fn delete_article(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM articles WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(ReadOneError::ArticleNotFound(id));
        }
        Ok(())
    }

    fn set_read(&self, article_id: i64, is_read: bool) -> Result<()> {
        let conn = self.conn()?;

        let updated = conn.execute(
            "UPDATE articles SET is_read = ?1 WHERE id = ?2",
            params![is_read, article_id],
        )?;
        if updated == 0 {
            return Err(ReadOneError::ArticleNotFound(article_id));
        }

        Ok(())
    }

    fn set_starred(&self, article_id: i64, is_starred: bool) -> Result<()> {
        let conn = self.conn()?;

        let updated = conn.execute(
            "UPDATE articles SET is_starred = ?1 WHERE id = ?2",
            params![is_starred, article_id],
        )?;
        if updated == 0 {
            return Err(ReadOneError::ArticleNotFound(article_id));
        }

        Ok(())
    }

    fn mark_feed_read(&self, feed_id: i64) -> Result<usize> {
        let conn = self.conn()?;

        let updated = conn.execute(
            "UPDATE articles SET is_read = 1 WHERE feed_id = ?1 AND is_read = 0",
            params![feed_id],
        )?;

        Ok(updated)
    }

    fn get_unread_count(&self, feed_id: i64) -> Result<i64> {
        let conn = self.conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM articles WHERE feed_id = ?1 AND is_read = 0",
            params![feed_id],
            |row| row.get(0),
        )?;

        Ok(count)
    }
}
