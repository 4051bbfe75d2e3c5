//! Contracts for everything the sync engine talks to but does not own.

use async_trait::async_trait;
use tracing::warn;

use crate::app::Result;
use crate::domain::{EpisodeKey, Item, ListenRecord, Source};

/// One page of items from the remote source.
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    pub items: Vec<Item>,
    /// Sources that failed while the rest of the page was assembled.
    pub failed_sources: Vec<String>,
}

impl FetchedPage {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            failed_sources: Vec::new(),
        }
    }
}

#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch `limit` items starting at `offset`, newest first, across the
    /// given subscriptions. `scope` narrows the fetch to one source id.
    async fn fetch_items(
        &self,
        subscriptions: &[Source],
        limit: usize,
        offset: usize,
        scope: Option<&str>,
    ) -> Result<FetchedPage>;

    async fn fetch_subscriptions(&self) -> Result<Vec<Source>>;

    async fn create_subscription(&self, url: &str) -> Result<Source>;

    async fn delete_subscription(&self, id: &str) -> Result<()>;
}

/// Remote mirror of per-episode listen state.
#[async_trait]
pub trait ListenRemote: Send + Sync {
    async fn get_listen_states(&self) -> Result<Vec<ListenRecord>>;

    async fn set_listen_position(&self, key: &EpisodeKey, position_secs: f64) -> Result<()>;

    async fn set_listen_finished(&self, key: &EpisodeKey) -> Result<()>;
}

/// String storage that survives restarts.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Receives human-readable failure messages for display.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Default sink: failures end up in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        warn!("{}", message);
    }
}
