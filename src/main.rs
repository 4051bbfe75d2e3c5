use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use feedloop::app::{Collaborators, Session};
use feedloop::cli::commands::{self, ConsoleNotifier};
use feedloop::cli::{Cli, Commands};
use feedloop::config::Config;
use feedloop::store::SqliteStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let store = Arc::new(SqliteStore::new(config.storage.resolve_db_path()?)?);

    match &cli.command {
        Commands::Sources => {
            commands::list_sources(&store)?;
            return Ok(());
        }
        Commands::Import { path } => {
            commands::import_items(&store, path)?;
            return Ok(());
        }
        _ => {}
    }

    let collab = Collaborators::local(store, Arc::new(ConsoleNotifier));
    let mut session = Session::new(collab, &config);
    session.start().await?;

    match cli.command {
        Commands::Subscribe { url } => {
            commands::subscribe(&session, &url).await?;
        }
        Commands::Unsubscribe { id } => {
            commands::unsubscribe(&session, &id).await?;
        }
        Commands::Refresh { force, latest } => {
            commands::refresh(&session, force, latest).await?;
        }
        Commands::List { filter, pages } => {
            commands::list_items(&session, filter, pages).await?;
        }
        Commands::Progress { key, secs } => {
            commands::record_progress(&mut session, &key, secs).await?;
        }
        Commands::Finish { key } => {
            commands::mark_finished(&mut session, &key).await?;
        }
        Commands::Toggle { key } => {
            commands::toggle_finished(&mut session, &key).await?;
        }
        Commands::Watch { interval } => {
            commands::watch(&mut session, interval.as_deref()).await?;
        }
        Commands::Sources | Commands::Import { .. } => {}
    }

    Ok(())
}
