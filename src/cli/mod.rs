pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "readone")]
#[command(about = "Fetch, deduplicate and read RSS/Atom feeds", long_about = None)]
pub struct Cli {
    /// Number of parallel workers for refreshing feeds (overrides the config file)
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Subscribe to a feed and store its current articles
    Add {
        /// URL of the feed to add (https:// is assumed when omitted)
        url: String,
        /// Fetch through the full-text proxy
        #[arg(long)]
        full_text: bool,
        /// Use this title instead of the one the feed reports
        #[arg(long)]
        title: Option<String>,
    },
    /// Fetch a feed and show what it contains without storing anything
    Preview {
        url: String,
        #[arg(long)]
        full_text: bool,
        /// Print the parsed feed as JSON
        #[arg(long)]
        json: bool,
    },
    /// Refresh one feed, or every feed when no URL is given
    Refresh {
        url: Option<String>,
    },
    /// List feeds or articles
    List {
        /// Show articles instead of feeds
        #[arg(long)]
        items: bool,
        /// Only starred articles
        #[arg(long)]
        starred: bool,
        /// Only unread articles
        #[arg(long)]
        unread: bool,
        /// Only articles of this feed
        #[arg(long)]
        feed: Option<String>,
    },
    /// Search article titles, descriptions and content
    Search { query: String },
    /// Mark an article as read
    Read {
        id: i64,
        /// Mark as unread instead
        #[arg(long)]
        unread: bool,
    },
    /// Print an article and mark it as read
    Show { id: i64 },
    /// Delete an article. It comes back if the feed still lists it on refresh.
    Delete { id: i64 },
    /// Mark every article of a feed as read
    MarkAllRead { url: String },
    /// Star an article
    Star {
        id: i64,
        /// Remove the star instead
        #[arg(long)]
        unstar: bool,
    },
    /// Change a feed's settings
    Edit {
        /// Current URL of the feed
        url: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// New source URL
        #[arg(long = "url")]
        new_url: Option<String>,
        /// Enable or disable the full-text proxy
        #[arg(long)]
        full_text: Option<bool>,
    },
    /// Remove a feed and all of its articles
    Remove {
        /// URL of the feed to remove
        url: String,
    },
}
