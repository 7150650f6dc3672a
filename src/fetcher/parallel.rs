use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::app::events::{EventBus, FeedEvent};
use crate::app::Result;
use crate::domain::Feed;
use crate::ingest::Ingestor;
use crate::merge::MergeOutcome;
use crate::store::Store;

pub const DEFAULT_WORKERS: usize = 10;

/// Refreshes many feeds concurrently, at most `workers` requests in flight.
pub struct ParallelFetcher {
    semaphore: Arc<Semaphore>,
}

impl Default for ParallelFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ParallelFetcher {
    pub fn new() -> Self {
        Self::with_workers(DEFAULT_WORKERS)
    }

    pub fn with_workers(workers: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Fetch and merge every feed. Each feed is independent: a failure is
    /// logged, published as [`FeedEvent::RefreshFailed`] and reported in the
    /// result list without affecting the others.
    pub async fn refresh_all<S: Store + Send + Sync + 'static>(
        &self,
        feeds: Vec<Feed>,
        store: Arc<S>,
        ingestor: &Ingestor,
        events: &EventBus,
    ) -> Vec<(i64, Result<MergeOutcome>)> {
        let mut handles = Vec::new();
        let mut scheduled = HashSet::new();

        for feed in feeds {
            // One merge per feed per batch.
            if !scheduled.insert(feed.id) {
                continue;
            }

            let semaphore = self.semaphore.clone();
            let store = store.clone();
            let ingestor = ingestor.clone();
            let events = events.clone();

            let handle = tokio::spawn(async move {
                let result = match semaphore.acquire().await {
                    Ok(_permit) => refresh_feed(&ingestor, &feed, store.as_ref(), &events).await,
                    Err(e) => Err(crate::app::ReadOneError::Config(e.to_string())),
                };
                (feed.id, result)
            });

            handles.push(handle);
        }

        let mut results = Vec::new();
        for handle in futures::future::join_all(handles).await {
            match handle {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                }
            }
        }

        results
    }
}

/// Fetch one feed and merge it. Nothing is written unless the whole feed
/// was fetched and parsed.
pub async fn refresh_feed<S: Store + ?Sized>(
    ingestor: &Ingestor,
    feed: &Feed,
    store: &S,
    events: &EventBus,
) -> Result<MergeOutcome> {
    let parsed = match ingestor.fetch_stored(feed).await {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Failed to refresh feed {}: {}", feed.display_title(), e);
            events.publish(FeedEvent::RefreshFailed {
                feed_id: feed.id,
                error: e.to_string(),
            });
            return Err(e);
        }
    };

    let outcome = store.merge_into_feed(feed.id, &parsed)?;
    tracing::info!(
        "Added {} new articles from {} ({} known, {} without link)",
        outcome.inserted_count(),
        feed.url,
        outcome.skipped_duplicates,
        outcome.skipped_without_link
    );

    events.publish(FeedEvent::ArticlesChanged {
        feed_id: feed.id,
        inserted: outcome.inserted_count(),
    });

    Ok(outcome)
}
