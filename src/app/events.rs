use tokio::sync::broadcast;

/// Capacity of the event channel. Slow subscribers lag rather than block
/// a refresh.
pub const EVENT_CAPACITY: usize = 64;

/// Notifications about changes to the stored feed/article collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// A merge finished for the feed. `inserted` may be zero.
    ArticlesChanged { feed_id: i64, inserted: usize },
    /// Fetching or parsing the feed failed; nothing was merged.
    RefreshFailed { feed_id: i64, error: String },
    /// The feed and all of its articles were deleted.
    FeedRemoved { feed_id: i64 },
}

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<FeedEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: FeedEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("No event subscribers");
        }
    }
}
