use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::app::error::{ReadOneError, Result};
use crate::app::events::{EventBus, FeedEvent};
use crate::config::Config;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::parallel::ParallelFetcher;
use crate::fetcher::Fetcher;
use crate::ingest::Ingestor;
use crate::normalizer::Normalizer;
use crate::store::sqlite::SqliteStore;

pub struct AppContext {
    pub store: Arc<SqliteStore>,
    pub ingestor: Ingestor,
    pub parallel_fetcher: ParallelFetcher,
    pub events: EventBus,
}

impl AppContext {
    pub fn new(config: &Config, db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store = Arc::new(SqliteStore::new(&db_path)?);
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.fetch)?);
        Ok(Self::with_parts(config, store, fetcher))
    }

    pub fn in_memory(config: &Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.fetch)?);
        Ok(Self::with_parts(config, store, fetcher))
    }

    pub fn with_parts(
        config: &Config,
        store: Arc<SqliteStore>,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
    ) -> Self {
        let normalizer = Normalizer::with_favicon_provider(config.icons.favicon_provider.clone());
        let ingestor = Ingestor::new(fetcher, normalizer, config.full_text.proxy_base.clone());
        let parallel_fetcher = ParallelFetcher::with_workers(config.fetch.workers);

        Self {
            store,
            ingestor,
            parallel_fetcher,
            events: EventBus::new(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.events.subscribe()
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| ReadOneError::Config("Could not find data directory".into()))?;
        let readone_dir = data_dir.join("readone");
        std::fs::create_dir_all(&readone_dir)?;
        Ok(readone_dir.join("readone.db"))
    }
}
