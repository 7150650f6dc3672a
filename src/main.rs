use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use readone::app::AppContext;
use readone::cli::{commands, Cli, Commands};
use readone::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(workers) = cli.workers {
        config.fetch.workers = workers;
    }

    let ctx = AppContext::new(&config, None)?;

    match cli.command {
        Commands::Add {
            url,
            full_text,
            title,
        } => {
            commands::add_feed(&ctx, &url, title, full_text).await?;
        }
        Commands::Preview {
            url,
            full_text,
            json,
        } => {
            commands::preview_feed(&ctx, &url, full_text, json).await?;
        }
        Commands::Refresh { url } => {
            commands::refresh(&ctx, url.as_deref()).await?;
        }
        Commands::List {
            items,
            starred,
            unread,
            feed,
        } => {
            if items || starred || unread || feed.is_some() {
                commands::list_articles(&ctx, starred, unread, feed.as_deref())?;
            } else {
                commands::list_feeds(&ctx)?;
            }
        }
        Commands::Search { query } => {
            commands::search(&ctx, &query)?;
        }
        Commands::Read { id, unread } => {
            commands::set_read(&ctx, id, !unread)?;
        }
        Commands::Show { id } => {
            commands::show_article(&ctx, id)?;
        }
        Commands::Delete { id } => {
            commands::delete_article(&ctx, id)?;
        }
        Commands::MarkAllRead { url } => {
            commands::mark_all_read(&ctx, &url)?;
        }
        Commands::Star { id, unstar } => {
            commands::set_starred(&ctx, id, !unstar)?;
        }
        Commands::Edit {
            url,
            title,
            description,
            new_url,
            full_text,
        } => {
            commands::edit_feed(&ctx, &url, title, description, new_url, full_text)?;
        }
        Commands::Remove { url } => {
            commands::remove_feed(&ctx, &url)?;
        }
    }

    Ok(())
}
