use crate::app::{AppContext, FeedEvent, ReadOneError, Result};
use crate::domain::{normalize_feed_url, Article, Feed, FeedUpdate};
use crate::fetcher::parallel::refresh_feed;
use crate::store::Store;

pub async fn add_feed(
    ctx: &AppContext,
    input: &str,
    title: Option<String>,
    use_full_text: bool,
) -> Result<i64> {
    let url = normalize_feed_url(input)?;

    if ctx.store.get_feed_by_url(&url)?.is_some() {
        return Err(ReadOneError::FeedExists(url));
    }

    // Nothing is stored unless the feed can be fetched and parsed.
    let parsed = ctx.ingestor.fetch_feed_for(&url, use_full_text).await?;

    let mut feed = Feed::new(url.clone(), title.unwrap_or_else(|| parsed.title.clone()));
    feed.description = parsed.description.clone();
    feed.image_url = parsed.image_url.clone();
    feed.use_full_text = use_full_text;

    let (feed_id, outcome) = ctx.store.add_feed_with_articles(&feed, &parsed)?;
    ctx.events.publish(FeedEvent::ArticlesChanged {
        feed_id,
        inserted: outcome.inserted_count(),
    });

    println!("Added feed: {}", feed.display_title());
    println!("  {}", url);
    println!("Fetched {} articles", outcome.inserted_count());

    Ok(feed_id)
}

pub async fn preview_feed(
    ctx: &AppContext,
    input: &str,
    use_full_text: bool,
    json: bool,
) -> Result<()> {
    let url = normalize_feed_url(input)?;
    let parsed = ctx.ingestor.fetch_feed_for(&url, use_full_text).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&parsed)?);
        return Ok(());
    }

    println!("{}", parsed.title);
    if !parsed.description.is_empty() {
        println!("  {}", parsed.description);
    }
    if let Some(icon) = &parsed.image_url {
        println!("  icon: {}", icon);
    }
    println!("{} articles", parsed.articles.len());

    for article in &parsed.articles {
        println!(
            "  {} {}",
            article.published_at.format("%Y-%m-%d"),
            article.title
        );
    }

    Ok(())
}

pub async fn refresh(ctx: &AppContext, url: Option<&str>) -> Result<()> {
    if let Some(input) = url {
        let feed = find_feed(ctx, input)?;
        let outcome = refresh_feed(&ctx.ingestor, &feed, ctx.store.as_ref(), &ctx.events).await?;
        println!(
            "{} new articles from {}",
            outcome.inserted_count(),
            feed.display_title()
        );
        return Ok(());
    }

    let feeds = ctx.store.get_all_feeds()?;

    if feeds.is_empty() {
        println!("No feeds to refresh");
        return Ok(());
    }

    println!("Refreshing {} feeds...", feeds.len());

    let results = ctx
        .parallel_fetcher
        .refresh_all(feeds, ctx.store.clone(), &ctx.ingestor, &ctx.events)
        .await;

    let mut total_new = 0;
    let mut errors = 0;

    for (feed_id, result) in results {
        match result {
            Ok(outcome) => {
                total_new += outcome.inserted_count();
                if outcome.inserted_count() > 0 {
                    if let Ok(Some(feed)) = ctx.store.get_feed(feed_id) {
                        println!(
                            "  {} new articles from {}",
                            outcome.inserted_count(),
                            feed.display_title()
                        );
                    }
                }
            }
            Err(e) => {
                errors += 1;
                if let Ok(Some(feed)) = ctx.store.get_feed(feed_id) {
                    let action = if e.is_ingestion() { "refreshing" } else { "storing" };
                    eprintln!("  Error {} {}: {}", action, feed.display_title(), e);
                }
            }
        }
    }

    println!(
        "Refresh complete: {} new articles, {} errors",
        total_new, errors
    );
    Ok(())
}

pub fn list_feeds(ctx: &AppContext) -> Result<()> {
    let feeds = ctx.store.get_all_feeds()?;

    if feeds.is_empty() {
        println!("No feeds");
        return Ok(());
    }

    for feed in feeds {
        let unread = ctx.store.get_unread_count(feed.id)?;
        let mode = if feed.use_full_text { " [full text]" } else { "" };
        println!(
            "{} ({} unread){}\n  {}\n  updated {}",
            feed.display_title(),
            unread,
            mode,
            feed.url,
            feed.last_updated.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

pub fn list_articles(
    ctx: &AppContext,
    starred: bool,
    unread: bool,
    feed: Option<&str>,
) -> Result<()> {
    let mut articles = match feed {
        Some(input) => {
            let feed = find_feed(ctx, input)?;
            let mut articles = ctx.store.get_articles_by_feed(feed.id)?;
            articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
            articles
        }
        None if starred => ctx.store.get_starred_articles()?,
        None => ctx.store.get_all_articles()?,
    };

    articles.retain(|a| (!starred || a.is_starred) && (!unread || !a.is_read));
    print_articles(&articles);
    Ok(())
}

pub fn search(ctx: &AppContext, query: &str) -> Result<()> {
    let articles = ctx.store.search_articles(query)?;
    if articles.is_empty() {
        println!("No articles found for \"{}\"", query.trim());
        return Ok(());
    }
    print_articles(&articles);
    Ok(())
}

pub fn set_read(ctx: &AppContext, id: i64, is_read: bool) -> Result<()> {
    ctx.store.set_read(id, is_read)?;
    notify_article_state(ctx, id)?;
    println!(
        "Marked article {} as {}",
        id,
        if is_read { "read" } else { "unread" }
    );
    Ok(())
}

pub fn set_starred(ctx: &AppContext, id: i64, is_starred: bool) -> Result<()> {
    ctx.store.set_starred(id, is_starred)?;
    notify_article_state(ctx, id)?;
    println!(
        "{} article {}",
        if is_starred { "Starred" } else { "Unstarred" },
        id
    );
    Ok(())
}

pub fn show_article(ctx: &AppContext, id: i64) -> Result<()> {
    let article = find_article(ctx, id)?;

    println!("{}", article.title);
    println!("{}", article.link);
    if article.author.is_empty() {
        println!("{}", article.published_at.format("%Y-%m-%d %H:%M"));
    } else {
        println!(
            "{} by {}",
            article.published_at.format("%Y-%m-%d %H:%M"),
            article.author
        );
    }
    println!();
    println!("{}", article.display_content());

    if !article.is_read {
        ctx.store.set_read(article.id, true)?;
        ctx.events.publish(FeedEvent::ArticlesChanged {
            feed_id: article.feed_id,
            inserted: 0,
        });
    }

    Ok(())
}

pub fn delete_article(ctx: &AppContext, id: i64) -> Result<()> {
    let article = find_article(ctx, id)?;

    ctx.store.delete_article(article.id)?;
    ctx.events.publish(FeedEvent::ArticlesChanged {
        feed_id: article.feed_id,
        inserted: 0,
    });
    println!("Deleted article {}: {}", id, article.title);
    Ok(())
}

pub fn mark_all_read(ctx: &AppContext, input: &str) -> Result<()> {
    let feed = find_feed(ctx, input)?;
    let count = ctx.store.mark_feed_read(feed.id)?;
    ctx.events.publish(FeedEvent::ArticlesChanged {
        feed_id: feed.id,
        inserted: 0,
    });
    println!("Marked {} articles read in {}", count, feed.display_title());
    Ok(())
}

pub fn edit_feed(
    ctx: &AppContext,
    input: &str,
    title: Option<String>,
    description: Option<String>,
    new_url: Option<String>,
    use_full_text: Option<bool>,
) -> Result<()> {
    let feed = find_feed(ctx, input)?;

    let url = match new_url {
        Some(raw) => {
            let url = normalize_feed_url(&raw)?;
            if url != feed.url && ctx.store.get_feed_by_url(&url)?.is_some() {
                return Err(ReadOneError::FeedExists(url));
            }
            Some(url)
        }
        None => None,
    };

    let update = FeedUpdate {
        title: title.map(|t| t.trim().to_string()),
        url,
        description: description.map(|d| d.trim().to_string()),
        use_full_text,
        ..Default::default()
    };
    ctx.store.update_feed(feed.id, &update)?;

    println!("Updated feed: {}", feed.display_title());
    Ok(())
}

pub fn remove_feed(ctx: &AppContext, input: &str) -> Result<()> {
    let feed = find_feed(ctx, input)?;

    ctx.store.delete_feed(feed.id)?;
    ctx.events.publish(FeedEvent::FeedRemoved { feed_id: feed.id });
    println!("Removed feed: {}", feed.url);
    Ok(())
}

/// Look a feed up by its URL as typed, then by its normalized form.
fn find_feed(ctx: &AppContext, input: &str) -> Result<Feed> {
    if let Some(feed) = ctx.store.get_feed_by_url(input.trim())? {
        return Ok(feed);
    }
    let url = normalize_feed_url(input)?;
    ctx.store
        .get_feed_by_url(&url)?
        .ok_or(ReadOneError::FeedNotFound(url))
}

fn find_article(ctx: &AppContext, id: i64) -> Result<Article> {
    ctx.store
        .get_article(id)?
        .ok_or(ReadOneError::ArticleNotFound(id))
}

fn notify_article_state(ctx: &AppContext, id: i64) -> Result<()> {
    let article = find_article(ctx, id)?;
    ctx.events.publish(FeedEvent::ArticlesChanged {
        feed_id: article.feed_id,
        inserted: 0,
    });
    Ok(())
}

fn print_articles(articles: &[Article]) {
    if articles.is_empty() {
        println!("No articles");
        return;
    }

    for article in articles {
        let read_marker = if article.is_read { " " } else { "●" };
        let star_marker = if article.is_starred { "★" } else { " " };

        println!(
            "{:>6} {}{} {} {}",
            article.id,
            read_marker,
            star_marker,
            article.published_at.format("%Y-%m-%d"),
            article.title
        );
    }
}
