//! Reconcile a freshly parsed feed with the articles already stored for it.
//!
//! Articles are keyed by guid. Known guids are never inserted again and the
//! existing articles are never touched, so read/starred state survives any
//! number of refreshes.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::domain::{Article, Feed, ParsedFeed};

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub feed_id: i64,
    /// New articles in the order they appeared in the parsed feed.
    pub inserted: Vec<Article>,
    pub skipped_duplicates: usize,
    pub skipped_without_link: usize,
    pub refreshed_at: DateTime<Utc>,
}

impl MergeOutcome {
    pub fn inserted_count(&self) -> usize {
        self.inserted.len()
    }
}

/// Decide which parsed items become new articles for `feed_id`.
///
/// `existing` holds the guids already stored for the feed. Items without a
/// link are dropped, as are guids seen earlier in `existing` or in this batch.
pub fn plan_merge<'a, I>(feed_id: i64, existing: I, parsed: &ParsedFeed) -> MergeOutcome
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashSet<String> = existing.into_iter().map(String::from).collect();
    let mut inserted = Vec::new();
    let mut skipped_duplicates = 0;
    let mut skipped_without_link = 0;

    for item in &parsed.articles {
        let Some(article) = Article::from_parsed(feed_id, item) else {
            skipped_without_link += 1;
            continue;
        };

        if !seen.insert(article.guid.clone()) {
            skipped_duplicates += 1;
            continue;
        }

        inserted.push(article);
    }

    MergeOutcome {
        feed_id,
        inserted,
        skipped_duplicates,
        skipped_without_link,
        refreshed_at: Utc::now(),
    }
}

/// Merge `parsed` into an in-memory feed and its owned articles.
///
/// New articles are appended to `articles` and `feed.last_updated` is set to
/// the refresh time even when nothing new arrived.
pub fn merge_into_feed(
    feed: &mut Feed,
    articles: &mut Vec<Article>,
    parsed: &ParsedFeed,
) -> MergeOutcome {
    let outcome = plan_merge(feed.id, articles.iter().map(|a| a.guid.as_str()), parsed);

    articles.extend(outcome.inserted.iter().cloned());
    feed.last_updated = outcome.refreshed_at;

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParsedArticle;

    fn item(guid: &str, link: Option<&str>) -> ParsedArticle {
        ParsedArticle {
            title: format!("Title {}", guid),
            link: link.map(String::from),
            description: String::new(),
            content: String::new(),
            author: String::new(),
            published_at: Utc::now(),
            guid: guid.to_string(),
            image_url: None,
        }
    }

    fn parsed(guids: &[&str]) -> ParsedFeed {
        ParsedFeed {
            title: "Example".into(),
            description: String::new(),
            image_url: None,
            articles: guids
                .iter()
                .map(|g| item(g, Some(&format!("https://example.com/{}", g))))
                .collect(),
        }
    }

    fn feed() -> Feed {
        let mut feed = Feed::new("https://example.com/feed".into(), "Example".into());
        feed.id = 1;
        feed
    }

    fn guids(articles: &[Article]) -> Vec<&str> {
        articles.iter().map(|a| a.guid.as_str()).collect()
    }

    #[test]
    fn test_first_merge_inserts_in_order() {
        let mut feed = feed();
        let mut articles = Vec::new();

        let outcome = merge_into_feed(&mut feed, &mut articles, &parsed(&["a", "b", "c"]));

        assert_eq!(outcome.inserted_count(), 3);
        assert_eq!(guids(&articles), vec!["a", "b", "c"]);
        assert!(articles.iter().all(|a| a.feed_id == 1));
    }

    #[test]
    fn test_second_merge_adds_only_new_guid_and_keeps_flags() {
        let mut feed = feed();
        let mut articles = Vec::new();
        merge_into_feed(&mut feed, &mut articles, &parsed(&["a", "b", "c"]));

        articles[1].is_read = true;
        articles[2].is_starred = true;
        let b_before = articles[1].clone();
        let c_before = articles[2].clone();

        let outcome = merge_into_feed(&mut feed, &mut articles, &parsed(&["b", "c", "d"]));

        assert_eq!(outcome.inserted_count(), 1);
        assert_eq!(outcome.skipped_duplicates, 2);
        assert_eq!(guids(&articles), vec!["a", "b", "c", "d"]);
        assert_eq!(articles[1], b_before);
        assert_eq!(articles[2], c_before);
        assert!(articles[1].is_read);
        assert!(articles[2].is_starred);
        assert!(!articles[3].is_read);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut feed = feed();
        let mut articles = Vec::new();
        let result = parsed(&["a", "b"]);

        merge_into_feed(&mut feed, &mut articles, &result);
        let once = articles.clone();
        let outcome = merge_into_feed(&mut feed, &mut articles, &result);

        assert_eq!(outcome.inserted_count(), 0);
        assert_eq!(articles, once);
    }

    #[test]
    fn test_duplicate_guid_within_batch_inserted_once() {
        let mut result = parsed(&["x", "x", "y"]);
        result.articles[1].title = "Second copy".into();

        let outcome = plan_merge(1, std::iter::empty(), &result);

        assert_eq!(guids(&outcome.inserted), vec!["x", "y"]);
        assert_eq!(outcome.inserted[0].title, "Title x");
        assert_eq!(outcome.skipped_duplicates, 1);
    }

    #[test]
    fn test_items_without_link_are_skipped() {
        let mut result = parsed(&["a"]);
        result.articles.push(item("nolink", None));
        result.articles.push(item("blank", Some("  ")));

        let outcome = plan_merge(1, std::iter::empty(), &result);

        assert_eq!(guids(&outcome.inserted), vec!["a"]);
        assert_eq!(outcome.skipped_without_link, 2);
    }

    #[test]
    fn test_skipped_linkless_item_does_not_reserve_guid() {
        let mut result = ParsedFeed {
            articles: vec![item("g", None)],
            ..parsed(&[])
        };
        result.articles.push(item("g", Some("https://example.com/g")));

        let outcome = plan_merge(1, std::iter::empty(), &result);
        assert_eq!(guids(&outcome.inserted), vec!["g"]);
    }

    #[test]
    fn test_empty_merge_still_updates_timestamp() {
        let mut feed = feed();
        feed.last_updated = Utc::now() - chrono::Duration::days(3);
        let before = feed.last_updated;
        let mut articles = Vec::new();

        let outcome = merge_into_feed(&mut feed, &mut articles, &parsed(&[]));

        assert_eq!(outcome.inserted_count(), 0);
        assert!(feed.last_updated > before);
        assert_eq!(feed.last_updated, outcome.refreshed_at);
    }
}
