//! # ReadOne
//!
//! Feed ingestion and article deduplication for the ReadOne RSS/Atom reader.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Normalizer → Merge → Store
//!              (Ingestor)
//! ```
//!
//! - [`fetcher`]: HTTP client and bounded parallel refresh
//! - [`normalizer`]: Converts RSS/Atom/JSON feeds to [`ParsedFeed`](domain::ParsedFeed)
//! - [`ingest`]: Fetch-and-parse entry point
//! - [`merge`]: Guid-keyed reconciliation of parsed items with stored articles
//! - [`store`]: SQLite persistence layer
//!
//! ## Quick Start
//!
//! ```bash
//! # Add a feed (optionally through the full-text proxy)
//! readone add https://blog.rust-lang.org/feed.xml
//! readone add example.com/rss --full-text
//!
//! # Refresh every feed
//! readone refresh
//!
//! # List unread articles
//! readone list --items --unread
//! ```

/// Application context, error types and change notifications.
///
/// [`AppContext`](app::AppContext) wires together the store, ingestor,
/// parallel fetcher and event bus.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Configuration loaded from `~/.config/readone/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`Feed`](domain::Feed): a subscription and its settings
/// - [`Article`](domain::Article): a stored item with read/starred state
/// - [`ParsedFeed`](domain::ParsedFeed): the output of one fetch
pub mod domain;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): async trait for fetching feed bytes
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
/// - [`ParallelFetcher`](fetcher::parallel::ParallelFetcher): concurrent refresh with semaphore
pub mod fetcher;

pub mod ingest;

pub mod merge;

/// Feed parsing and normalization.
///
/// Parses RSS 0.9x/1.0/2.0, Atom 0.3/1.0 and JSON Feed 1.x, choosing the
/// content, date and cover image for each entry.
pub mod normalizer;

/// SQLite persistence layer.
///
/// - [`Store`](store::Store): trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;
