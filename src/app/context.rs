use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::app::error::Result;
use crate::config::Config;
use crate::domain::{normalize_feed_url, Item, ItemFilter, Source};
use crate::playback::Player;
use crate::remote::{KeyValueStore, ListenRemote, Notifier, RemoteSource};
use crate::store::SqliteStore;
use crate::sync::{FeedSync, RefreshLoop};

/// External services a session talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub remote: Arc<dyn RemoteSource>,
    pub listen: Arc<dyn ListenRemote>,
    pub kv: Arc<dyn KeyValueStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl Collaborators {
    /// Everything backed by one local SQLite catalog.
    pub fn local(store: Arc<SqliteStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            remote: store.clone(),
            listen: store.clone(),
            kv: store,
            notifier,
        }
    }
}

/// One signed-in session: the feed it displays, the player, and the
/// background refresh loop. Logging out builds a new session.
pub struct Session {
    collab: Collaborators,
    config: Config,
    feed: Arc<FeedSync>,
    player: Player,
    refresh: Option<RefreshLoop>,
}

impl Session {
    pub fn new(collab: Collaborators, config: &Config) -> Self {
        let feed = FeedSync::new(
            collab.remote.clone(),
            collab.kv.clone(),
            collab.notifier.clone(),
            &config.sync,
        );
        let player = Player::new(collab.listen.clone(), config.playback.progress_interval);
        Self {
            collab,
            config: config.clone(),
            feed: Arc::new(feed),
            player,
            refresh: None,
        }
    }

    /// Show the cached feed, then load subscriptions and listen states.
    ///
    /// Listen states are best-effort; a failure there leaves playback usable.
    pub async fn start(&mut self) -> Result<()> {
        self.feed.hydrate_cached();

        let (subscriptions, listen) = futures::join!(
            self.collab.remote.fetch_subscriptions(),
            self.player.hydrate()
        );

        if let Err(e) = listen {
            warn!("Could not load listen states: {}", e);
        }

        match subscriptions {
            Ok(sources) => {
                info!("Session started with {} subscriptions", sources.len());
                self.feed.set_subscriptions(sources);
                Ok(())
            }
            Err(e) => {
                self.collab
                    .notifier
                    .notify(&format!("Failed to load subscriptions: {}", e));
                Err(e)
            }
        }
    }

    pub fn feed(&self) -> &Arc<FeedSync> {
        &self.feed
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Subscribe to `url` and reload the feed to include it.
    pub async fn subscribe(&self, url: &str) -> Result<Source> {
        let created = match normalize_feed_url(url) {
            Ok(normalized) => self.collab.remote.create_subscription(&normalized).await,
            Err(e) => Err(e),
        };

        let source = match created {
            Ok(source) => source,
            Err(e) => {
                warn!("Subscribe to {} failed: {}", url, e);
                self.collab
                    .notifier
                    .notify(&format!("Failed to add feed from {}", url));
                return Err(e);
            }
        };

        info!("Subscribed to {}", source.display_title());
        self.feed.add_subscription(source.clone());
        if let Err(e) = self.feed.reload().await {
            warn!("Reload after subscribing to {} failed: {}", url, e);
        }
        Ok(source)
    }

    /// Unsubscribe and drop that source's items from the feed.
    pub async fn unsubscribe(&self, source_id: &str) -> Result<()> {
        if let Err(e) = self.collab.remote.delete_subscription(source_id).await {
            self.collab
                .notifier
                .notify(&format!("Failed to remove feed: {}", e));
            return Err(e);
        }
        self.feed.remove_subscription(source_id);
        info!("Unsubscribed from {}", source_id);
        Ok(())
    }

    /// Start the background refresh loop if it is not running.
    pub fn start_refresh_loop(&mut self) {
        if self.refresh.is_none() {
            self.refresh = Some(RefreshLoop::spawn(
                self.feed.clone(),
                self.config.sync.refresh_interval,
            ));
        }
    }

    pub async fn stop_refresh_loop(&mut self) {
        if let Some(refresh) = self.refresh.take() {
            refresh.shutdown().await;
        }
    }

    pub fn is_refreshing_in_background(&self) -> bool {
        self.refresh.as_ref().is_some_and(RefreshLoop::is_running)
    }

    /// Change the refresh interval, restarting the loop's timer.
    pub async fn set_refresh_interval(&mut self, interval: Duration) {
        self.config.sync.refresh_interval = interval;
        match &self.refresh {
            Some(refresh) => refresh.set_interval(interval).await,
            None => self.feed.set_refresh_interval(interval),
        }
    }

    /// Displayed items narrowed by the current filter.
    ///
    /// Listening filters apply to episodes only; the queue filter lists the
    /// queue in play order.
    pub fn visible_items(&self) -> Vec<Item> {
        let listen = self.player.listen();
        match self.feed.filter() {
            ItemFilter::Queue => self.player.queue().iter().cloned().collect(),
            filter => self
                .feed
                .displayed()
                .iter()
                .filter(|item| match &filter {
                    ItemFilter::All => true,
                    ItemFilter::Source(id) => item.source_id() == id,
                    ItemFilter::Continue => item.is_episode() && listen.state_for(item).is_in_progress(),
                    ItemFilter::Unlistened => item.is_episode() && listen.state_for(item).is_unlistened(),
                    ItemFilter::Queue => false,
                })
                .cloned()
                .collect(),
        }
    }

    /// Tear down this session and return a fresh one over the same services.
    pub async fn logout(mut self) -> Result<Session> {
        self.stop_refresh_loop().await;
        self.feed.clear_persisted()?;
        info!("Logged out");
        Ok(Session::new(self.collab.clone(), &self.config))
    }
}
