use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::app::{FeedloopError, Result, Session};
use crate::config::parse_interval;
use crate::domain::{EpisodeKey, Item, ItemFilter, Payload};
use crate::remote::Notifier;
use crate::store::{SqliteStore, Store};
use crate::sync::{LoadMore, RefreshOutcome};

/// Prints failure messages to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        eprintln!("! {}", message);
    }
}

pub async fn subscribe(session: &Session, url: &str) -> Result<()> {
    let source = session.subscribe(url).await?;
    println!("Subscribed to {} [{}]", source.display_title(), source.id);
    Ok(())
}

pub async fn unsubscribe(session: &Session, id: &str) -> Result<()> {
    session.unsubscribe(id).await?;
    println!("Unsubscribed from {}", id);
    Ok(())
}

pub fn list_sources(store: &SqliteStore) -> Result<()> {
    let sources = store.get_all_sources()?;

    if sources.is_empty() {
        println!("No subscriptions");
        return Ok(());
    }

    for source in sources {
        println!("{} [{}]\n  {}", source.display_title(), source.id, source.url);
    }

    Ok(())
}

/// One entry of an import file.
#[derive(Debug, Deserialize)]
struct ImportRecord {
    source_id: String,
    #[serde(default)]
    id: Option<String>,
    title: String,
    published_at: DateTime<Utc>,
    #[serde(flatten)]
    payload: Payload,
}

/// Import items from a JSON file into the local catalog
pub fn import_items(store: &SqliteStore, path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)?;
    let records: Vec<ImportRecord> = serde_json::from_str(&content)?;

    if records.is_empty() {
        println!("No items found in {}", path.display());
        return Ok(());
    }

    let mut items = Vec::with_capacity(records.len());
    for record in records {
        let source = store
            .get_source(&record.source_id)?
            .ok_or_else(|| FeedloopError::SourceNotFound(record.source_id.clone()))?;
        let item = Item::new(&source, record.title, record.published_at, record.payload);
        items.push(match record.id {
            Some(id) => item.with_id(id),
            None => item,
        });
    }

    let added = store.add_items(&items)?;
    println!(
        "Imported {} items ({} already present)",
        added,
        items.len() - added
    );
    Ok(())
}

pub async fn refresh(session: &Session, force: bool, latest: bool) -> Result<()> {
    let feed = session.feed();
    match feed.refresh(force).await? {
        RefreshOutcome::Skipped => {
            println!("Feed is up to date (refreshed recently, use --force to refresh anyway)")
        }
        RefreshOutcome::Loaded { count } => println!("Loaded {} items", count),
        RefreshOutcome::Promoted { count } => println!("Showing {} latest items", count),
        RefreshOutcome::UpToDate => println!("No new items"),
        RefreshOutcome::Superseded => println!("Refresh superseded by a newer one"),
        RefreshOutcome::UpdateAvailable { count } => {
            if latest && feed.promote() {
                println!("Showing {} latest items", count);
            } else {
                println!("New items available (run with --latest to show them)");
            }
        }
    }
    Ok(())
}

fn print_item(session: &Session, item: &Item) {
    let date = item.published_at().format("%Y-%m-%d");
    let label = session
        .player()
        .listen()
        .get_for(item)
        .and_then(|state| state.label())
        .map(|label| format!(" ({})", label))
        .unwrap_or_default();

    println!("{} {}: {}{}", date, item.source_title(), item.title(), label);
    if item.is_episode() {
        println!("    key: {}", item.key());
    }
}

pub async fn list_items(session: &Session, filter: ItemFilter, pages: usize) -> Result<()> {
    let feed = session.feed();
    feed.set_filter(filter).await?;

    for _ in 1..pages {
        match feed.load_more().await? {
            LoadMore::Appended {
                end_of_data: false, ..
            } => {}
            _ => break,
        }
    }

    let items = session.visible_items();
    if items.is_empty() {
        println!("No items");
        return Ok(());
    }

    for item in &items {
        print_item(session, item);
    }

    Ok(())
}

pub async fn record_progress(session: &mut Session, key: &str, secs: f64) -> Result<()> {
    let key = EpisodeKey::from(key);
    let state = session.player_mut().record_progress(&key, secs).await;
    println!("{}: {}", key, state.label().unwrap_or_else(|| "Unplayed".into()));
    Ok(())
}

pub async fn mark_finished(session: &mut Session, key: &str) -> Result<()> {
    let key = EpisodeKey::from(key);
    session.player_mut().mark_finished(&key).await;
    println!("{}: Finished", key);
    Ok(())
}

pub async fn toggle_finished(session: &mut Session, key: &str) -> Result<()> {
    let key = EpisodeKey::from(key);
    let state = session.player_mut().toggle_finished(&key).await;
    println!("{}: {}", key, state.label().unwrap_or_else(|| "Unplayed".into()));
    Ok(())
}

/// Run the refresh loop until Ctrl-C
pub async fn watch(session: &mut Session, interval: Option<&str>) -> Result<()> {
    if let Some(raw) = interval {
        let interval = parse_interval(raw).map_err(FeedloopError::Config)?;
        session.set_refresh_interval(interval).await;
    }

    session.start_refresh_loop();
    println!("Watching for new items, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    session.stop_refresh_loop().await;

    let pending = session.feed().pending();
    println!("Stopped. {} items in the latest fetch", pending.len());
    Ok(())
}
