use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::app::error::aggregate_source_failures;
use crate::app::{FeedloopError, Result};
use crate::config::SyncConfig;
use crate::domain::{ItemFilter, Source};
use crate::remote::{KeyValueStore, Notifier, RemoteSource};
use crate::sync::diff::{differs, Identity};
use crate::sync::pagination::{self, LoadMore, Paginator};
use crate::sync::{Snapshot, SnapshotStore, StalenessPolicy};

pub const LAST_FETCH_KEY: &str = "last_fetch";
pub const SNAPSHOT_KEY: &str = "displayed_snapshot";

/// When a newer pending snapshot replaces the displayed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromotePolicy {
    /// Only on an explicit "Get Latest".
    #[default]
    Manual,
    /// Automatically while the view reports the user is idle.
    WhenIdle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The last fetch is recent enough.
    Skipped,
    /// First load of the session went straight to displayed.
    Loaded { count: usize },
    /// Pending has new head items; the view should offer "Get Latest".
    UpdateAvailable { count: usize },
    /// Pending differed and was promoted by policy.
    Promoted { count: usize },
    /// Pending matches what is displayed.
    UpToDate,
    /// A newer refresh started before this one finished.
    Superseded,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Keeps the displayed feed in step with the remote source.
///
/// Background refreshes only ever write the pending snapshot; pagination
/// only ever grows the displayed one.
pub struct FeedSync {
    remote: Arc<dyn RemoteSource>,
    kv: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    snapshots: SnapshotStore,
    staleness: Mutex<StalenessPolicy>,
    paginator: Mutex<Paginator>,
    subscriptions: Mutex<Vec<Source>>,
    filter: Mutex<ItemFilter>,
    promote_policy: PromotePolicy,
    identity: Identity,
    idle: AtomicBool,
}

impl FeedSync {
    pub fn new(
        remote: Arc<dyn RemoteSource>,
        kv: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            remote,
            kv,
            notifier,
            snapshots: SnapshotStore::new(),
            staleness: Mutex::new(StalenessPolicy::new(config.refresh_interval)),
            paginator: Mutex::new(Paginator::new(config.page_size)),
            subscriptions: Mutex::new(Vec::new()),
            filter: Mutex::new(ItemFilter::All),
            promote_policy: config.promote,
            identity: config.identity,
            idle: AtomicBool::new(false),
        }
    }

    pub fn displayed(&self) -> Arc<Snapshot> {
        self.snapshots.displayed()
    }

    pub fn pending(&self) -> Arc<Snapshot> {
        self.snapshots.pending()
    }

    /// Whether pending has head items the view should offer.
    pub fn update_available(&self) -> bool {
        differs(
            self.snapshots.displayed().items(),
            self.snapshots.pending().items(),
            self.identity,
        ) && !self.snapshots.pending().is_empty()
    }

    pub fn filter(&self) -> ItemFilter {
        lock(&self.filter).clone()
    }

    pub fn subscriptions(&self) -> Vec<Source> {
        lock(&self.subscriptions).clone()
    }

    pub fn set_subscriptions(&self, sources: Vec<Source>) {
        *lock(&self.subscriptions) = sources;
    }

    pub fn add_subscription(&self, source: Source) {
        let mut subs = lock(&self.subscriptions);
        if !subs.iter().any(|s| s.id == source.id) {
            subs.push(source);
        }
    }

    /// Forget a source and drop its items from both snapshots.
    pub fn remove_subscription(&self, source_id: &str) {
        lock(&self.subscriptions).retain(|s| s.id != source_id);
        self.snapshots.remove_source(source_id);
    }

    pub fn refresh_interval(&self) -> Duration {
        lock(&self.staleness).interval()
    }

    pub fn set_refresh_interval(&self, interval: Duration) {
        *lock(&self.staleness) = StalenessPolicy::new(interval);
    }

    pub fn next_offset(&self) -> usize {
        lock(&self.paginator).next_offset()
    }

    /// Reported by the view; only matters for `PromotePolicy::WhenIdle`.
    pub fn set_idle(&self, idle: bool) {
        self.idle.store(idle, Ordering::SeqCst);
    }

    /// When the last successful fetch happened, if ever.
    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        match self.kv.get(LAST_FETCH_KEY) {
            Ok(Some(raw)) => DateTime::parse_from_rfc3339(&raw)
                .map(|dt| dt.with_timezone(&Utc))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                warn!("Could not read last fetch time: {}", e);
                None
            }
        }
    }

    fn record_last_fetch(&self, at: DateTime<Utc>) {
        if let Err(e) = self.kv.set(LAST_FETCH_KEY, &at.to_rfc3339()) {
            warn!("Could not persist last fetch time: {}", e);
        }
    }

    fn persist_displayed(&self) {
        let displayed = self.snapshots.displayed();
        let result = serde_json::to_string(displayed.as_ref())
            .map_err(FeedloopError::from)
            .and_then(|json| self.kv.set(SNAPSHOT_KEY, &json));
        if let Err(e) = result {
            warn!("Could not cache displayed snapshot: {}", e);
        }
    }

    /// Show the snapshot cached by a previous session, if any.
    ///
    /// The first successful fetch still replaces it.
    pub fn hydrate_cached(&self) -> bool {
        let raw = match self.kv.get(SNAPSHOT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(e) => {
                warn!("Could not read cached snapshot: {}", e);
                return false;
            }
        };
        match serde_json::from_str::<Snapshot>(&raw) {
            Ok(snapshot) => {
                debug!("Restored {} cached items", snapshot.len());
                self.snapshots.set_displayed(snapshot);
                // Only the first page is ever cached
                lock(&self.paginator).reset_to_first_page();
                true
            }
            Err(e) => {
                warn!("Ignoring unreadable cached snapshot: {}", e);
                false
            }
        }
    }

    /// Drop everything this feed persisted.
    pub fn clear_persisted(&self) -> Result<()> {
        self.kv.remove(LAST_FETCH_KEY)?;
        self.kv.remove(SNAPSHOT_KEY)?;
        Ok(())
    }

    fn report_partial_failures(&self, failed: &[String]) {
        if let Some(message) = aggregate_source_failures(failed) {
            warn!("{}", message);
            self.notifier.notify(&message);
        }
    }

    /// Fetch the first page into pending if the feed is stale (or `force`).
    ///
    /// A failure leaves both snapshots and the last fetch time untouched.
    pub async fn refresh(&self, force: bool) -> Result<RefreshOutcome> {
        let staleness = *lock(&self.staleness);
        if !force && !staleness.should_refresh(Utc::now(), self.last_fetch()) {
            debug!("Background fetch skipped");
            return Ok(RefreshOutcome::Skipped);
        }

        self.fetch_first_page(&self.filter(), false).await
    }

    /// Fetch the first page for `filter` into pending.
    ///
    /// With `replace`, pending goes straight to displayed and `filter` becomes
    /// the current filter, both only once the fetch has succeeded.
    async fn fetch_first_page(&self, filter: &ItemFilter, replace: bool) -> Result<RefreshOutcome> {
        let ticket = self.snapshots.begin_fetch();
        let subscriptions = self.subscriptions();
        let limit = lock(&self.paginator).page_size();

        let page = match self
            .remote
            .fetch_items(&subscriptions, limit, 0, filter.remote_scope())
            .await
        {
            Ok(page) => page,
            Err(e) => {
                warn!("Refresh failed: {}", e);
                self.notifier
                    .notify(&format!("Failed to refresh feeds: {}", e));
                return Err(e);
            }
        };

        self.report_partial_failures(&page.failed_sources);

        let snapshot = Snapshot::new(page.items);
        let count = snapshot.len();
        if !self.snapshots.complete_fetch(ticket, snapshot) {
            return Ok(RefreshOutcome::Superseded);
        }
        self.record_last_fetch(Utc::now());

        if replace || !self.snapshots.has_loaded() {
            if replace {
                *lock(&self.filter) = filter.clone();
            }
            self.snapshots.show_initial();
            self.after_displayed_replaced();
            info!("Loaded {} items", count);
            return Ok(RefreshOutcome::Loaded { count });
        }

        if !self.update_available() {
            return Ok(RefreshOutcome::UpToDate);
        }

        if self.promote_policy == PromotePolicy::WhenIdle && self.idle.load(Ordering::SeqCst) {
            if self.promote() {
                return Ok(RefreshOutcome::Promoted { count });
            }
            return Ok(RefreshOutcome::UpToDate);
        }

        debug!("New items available ({} in pending)", count);
        Ok(RefreshOutcome::UpdateAvailable { count })
    }

    /// Replace the feed with a fresh first page regardless of staleness.
    ///
    /// A failure leaves the displayed feed and its paging untouched.
    pub async fn reload(&self) -> Result<RefreshOutcome> {
        self.fetch_first_page(&self.filter(), true).await
    }

    /// "Get Latest": show pending. No-op if nothing new.
    pub fn promote(&self) -> bool {
        if !self.snapshots.promote() {
            return false;
        }
        self.after_displayed_replaced();
        info!("Promoted {} items", self.snapshots.displayed().len());
        true
    }

    fn after_displayed_replaced(&self) {
        lock(&self.paginator).reset_to_first_page();
        self.persist_displayed();
    }

    /// Switch filters and load the first page for the new one.
    ///
    /// The filter only changes once that page has arrived.
    pub async fn set_filter(&self, filter: ItemFilter) -> Result<RefreshOutcome> {
        self.fetch_first_page(&filter, true).await
    }

    /// Append the next page to the displayed snapshot.
    pub async fn load_more(&self) -> Result<LoadMore> {
        let request = match lock(&self.paginator).begin() {
            Ok(request) => request,
            Err(state) => return Ok(state),
        };

        let generation = self.snapshots.generation();
        let displayed = self.snapshots.displayed();
        let subscriptions = self.subscriptions();
        let filter = self.filter();

        let result = pagination::load_more(
            self.remote.as_ref(),
            &subscriptions,
            &displayed,
            request,
            &filter,
        )
        .await;

        let (grown, page) = match result {
            Ok(ok) => ok,
            Err(e) => {
                lock(&self.paginator).abort(request);
                warn!("Load more failed at offset {}: {}", request.offset, e);
                self.notifier
                    .notify(&format!("Failed to load more items: {}", e));
                return Err(e);
            }
        };

        self.report_partial_failures(&page.failed_sources);

        let count = page.items.len();
        if !self.snapshots.extend_displayed(generation, grown) {
            lock(&self.paginator).abort(request);
            debug!("Dropping page at offset {}: feed was replaced", request.offset);
            return Ok(LoadMore::Superseded);
        }

        lock(&self.paginator).finish(request, count);
        Ok(LoadMore::Appended {
            count,
            end_of_data: count < request.limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use crate::testing::{article, source, MockRemote, RecordingNotifier};
    use chrono::TimeDelta;

    struct Fixture {
        remote: Arc<MockRemote>,
        kv: Arc<SqliteStore>,
        notifier: Arc<RecordingNotifier>,
        sync: FeedSync,
    }

    fn fixture(remote: MockRemote, config: SyncConfig) -> Fixture {
        let remote = Arc::new(remote);
        let kv = Arc::new(SqliteStore::in_memory().unwrap());
        let notifier = Arc::new(RecordingNotifier::default());
        let sync = FeedSync::new(remote.clone(), kv.clone(), notifier.clone(), &config);
        sync.set_subscriptions(vec![source("s1"), source("s2")]);
        Fixture {
            remote,
            kv,
            notifier,
            sync,
        }
    }

    fn page_config(page_size: usize) -> SyncConfig {
        SyncConfig {
            page_size,
            ..SyncConfig::default()
        }
    }

    #[tokio::test]
    async fn test_first_refresh_goes_straight_to_displayed() {
        let s = source("s1");
        let fx = fixture(
            MockRemote::with_items(vec![article(&s, "a", 10), article(&s, "b", 5)]),
            SyncConfig::default(),
        );

        let outcome = fx.sync.refresh(false).await.unwrap();
        assert_eq!(outcome, RefreshOutcome::Loaded { count: 2 });
        assert_eq!(fx.sync.displayed().len(), 2);
        assert!(fx.sync.last_fetch().is_some());
        assert_eq!(fx.sync.next_offset(), 100);
    }

    #[tokio::test]
    async fn test_fresh_feed_skips_fetch() {
        let s = source("s1");
        let fx = fixture(MockRemote::with_items(vec![article(&s, "a", 10)]), SyncConfig::default());
        fx.kv
            .set(LAST_FETCH_KEY, &(Utc::now() - TimeDelta::minutes(2)).to_rfc3339())
            .unwrap();

        assert_eq!(fx.sync.refresh(false).await.unwrap(), RefreshOutcome::Skipped);
        assert!(fx.remote.fetch_calls().is_empty());
    }

    #[tokio::test]
    async fn test_stale_feed_fetches() {
        let s = source("s1");
        let fx = fixture(MockRemote::with_items(vec![article(&s, "a", 10)]), SyncConfig::default());
        fx.kv
            .set(LAST_FETCH_KEY, &(Utc::now() - TimeDelta::minutes(6)).to_rfc3339())
            .unwrap();

        assert_eq!(
            fx.sync.refresh(false).await.unwrap(),
            RefreshOutcome::Loaded { count: 1 }
        );
    }

    #[tokio::test]
    async fn test_new_head_item_is_offered_not_applied() {
        let s = source("s1");
        let fx = fixture(
            MockRemote::with_items(vec![article(&s, "A", 10), article(&s, "B", 5)]),
            SyncConfig::default(),
        );
        fx.sync.refresh(true).await.unwrap();

        fx.remote.push_item(article(&s, "C", 12));
        let outcome = fx.sync.refresh(true).await.unwrap();

        assert_eq!(outcome, RefreshOutcome::UpdateAvailable { count: 3 });
        assert!(fx.sync.update_available());
        assert_eq!(fx.sync.displayed().items()[0].title(), "A");

        assert!(fx.sync.promote());
        assert_eq!(fx.sync.displayed().items()[0].title(), "C");
        assert!(!fx.sync.update_available());
        assert!(!fx.sync.promote());
    }

    #[tokio::test]
    async fn test_unchanged_feed_is_up_to_date() {
        let s = source("s1");
        let fx = fixture(MockRemote::with_items(vec![article(&s, "A", 10)]), SyncConfig::default());
        fx.sync.refresh(true).await.unwrap();
        assert_eq!(fx.sync.refresh(true).await.unwrap(), RefreshOutcome::UpToDate);
    }

    #[tokio::test]
    async fn test_when_idle_policy_promotes_only_while_idle() {
        let s = source("s1");
        let config = SyncConfig {
            promote: PromotePolicy::WhenIdle,
            ..SyncConfig::default()
        };
        let fx = fixture(MockRemote::with_items(vec![article(&s, "A", 10)]), config);
        fx.sync.refresh(true).await.unwrap();

        fx.remote.push_item(article(&s, "B", 20));
        assert_eq!(
            fx.sync.refresh(true).await.unwrap(),
            RefreshOutcome::UpdateAvailable { count: 2 }
        );

        fx.sync.set_idle(true);
        assert_eq!(
            fx.sync.refresh(true).await.unwrap(),
            RefreshOutcome::Promoted { count: 2 }
        );
        assert_eq!(fx.sync.displayed().items()[0].title(), "B");
    }

    #[tokio::test]
    async fn test_failed_refresh_changes_nothing() {
        let s = source("s1");
        let fx = fixture(MockRemote::with_items(vec![article(&s, "A", 10)]), SyncConfig::default());
        fx.sync.refresh(true).await.unwrap();
        let fetched_at = fx.sync.last_fetch();

        fx.remote.fail_next_fetch();
        assert!(fx.sync.refresh(true).await.is_err());

        assert_eq!(fx.sync.displayed().len(), 1);
        assert_eq!(fx.sync.pending().len(), 1);
        assert_eq!(fx.sync.last_fetch(), fetched_at);
        assert_eq!(fx.notifier.messages().len(), 1);
        assert!(fx.notifier.messages()[0].starts_with("Failed to refresh feeds"));
    }

    #[tokio::test]
    async fn test_failed_first_refresh_stays_stale() {
        let fx = fixture(MockRemote::default(), SyncConfig::default());
        fx.remote.fail_next_fetch();
        assert!(fx.sync.refresh(false).await.is_err());
        assert!(fx.sync.last_fetch().is_none());

        // Retried immediately rather than after a full interval
        assert_eq!(
            fx.sync.refresh(false).await.unwrap(),
            RefreshOutcome::Loaded { count: 0 }
        );
    }

    #[tokio::test]
    async fn test_partial_source_failures_aggregate_into_one_toast() {
        let s = source("s1");
        let fx = fixture(MockRemote::with_items(vec![article(&s, "A", 10)]), SyncConfig::default());
        fx.remote
            .set_failed_sources(vec!["Broken One".into(), "Broken Two".into()]);

        let outcome = fx.sync.refresh(true).await.unwrap();
        assert_eq!(outcome, RefreshOutcome::Loaded { count: 1 });
        assert_eq!(
            fx.notifier.messages(),
            vec!["Failed to refresh 2 sources: Broken One, Broken Two".to_string()]
        );
    }

    #[tokio::test]
    async fn test_load_more_appends_and_advances_offset() {
        let s = source("s1");
        let items = (0..5).map(|i| article(&s, &format!("e{}", i), 100 - i)).collect();
        let fx = fixture(MockRemote::with_items(items), page_config(2));
        fx.sync.refresh(true).await.unwrap();
        let first = fx.sync.displayed();

        let outcome = fx.sync.load_more().await.unwrap();
        assert_eq!(
            outcome,
            LoadMore::Appended {
                count: 2,
                end_of_data: false
            }
        );
        let after = fx.sync.displayed();
        assert_eq!(after.len(), 4);
        assert_eq!(&after.items()[..2], first.items());
        assert_eq!(fx.sync.next_offset(), 4);

        assert_eq!(
            fx.sync.load_more().await.unwrap(),
            LoadMore::Appended {
                count: 1,
                end_of_data: true
            }
        );
        assert_eq!(fx.sync.load_more().await.unwrap(), LoadMore::Exhausted);

        let offsets: Vec<usize> = fx.remote.fetch_calls().iter().map(|c| c.1).collect();
        assert_eq!(offsets, vec![0, 2, 4]);
    }

    #[tokio::test]
    async fn test_background_refresh_does_not_touch_paginated_growth() {
        let s = source("s1");
        let items = (0..4).map(|i| article(&s, &format!("e{}", i), 100 - i)).collect();
        let fx = fixture(MockRemote::with_items(items), page_config(2));
        fx.sync.refresh(true).await.unwrap();
        fx.sync.load_more().await.unwrap();

        fx.remote.push_item(article(&s, "latest", 200));
        fx.sync.refresh(true).await.unwrap();

        assert_eq!(fx.sync.displayed().len(), 4);
        assert_eq!(fx.sync.pending().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_load_more_keeps_offset() {
        let s = source("s1");
        let items = (0..4).map(|i| article(&s, &format!("e{}", i), 100 - i)).collect();
        let fx = fixture(MockRemote::with_items(items), page_config(2));
        fx.sync.refresh(true).await.unwrap();

        fx.remote.fail_next_fetch();
        assert!(fx.sync.load_more().await.is_err());
        assert_eq!(fx.sync.displayed().len(), 2);
        assert_eq!(fx.sync.next_offset(), 2);

        fx.sync.load_more().await.unwrap();
        assert_eq!(fx.sync.displayed().len(), 4);
    }

    #[tokio::test]
    async fn test_promotion_resets_pagination() {
        let s = source("s1");
        let items = (0..4).map(|i| article(&s, &format!("e{}", i), 100 - i)).collect();
        let fx = fixture(MockRemote::with_items(items), page_config(2));
        fx.sync.refresh(true).await.unwrap();
        fx.sync.load_more().await.unwrap();
        assert_eq!(fx.sync.next_offset(), 4);

        fx.remote.push_item(article(&s, "latest", 200));
        fx.sync.refresh(true).await.unwrap();
        assert!(fx.sync.promote());
        assert_eq!(fx.sync.displayed().len(), 2);
        assert_eq!(fx.sync.next_offset(), 2);
    }

    #[tokio::test]
    async fn test_source_filter_scopes_fetch() {
        let a = source("s1");
        let b = source("s2");
        let fx = fixture(
            MockRemote::with_items(vec![article(&a, "from a", 10), article(&b, "from b", 9)]),
            SyncConfig::default(),
        );
        fx.sync.refresh(true).await.unwrap();
        assert_eq!(fx.sync.displayed().len(), 2);

        let outcome = fx.sync.set_filter(ItemFilter::Source("s2".into())).await.unwrap();
        assert_eq!(outcome, RefreshOutcome::Loaded { count: 1 });
        assert_eq!(fx.sync.filter(), ItemFilter::Source("s2".into()));
        assert_eq!(fx.sync.displayed().items()[0].title(), "from b");
        assert_eq!(fx.remote.fetch_calls().last().unwrap().2.as_deref(), Some("s2"));
    }

    #[tokio::test]
    async fn test_cached_snapshot_restored_then_replaced() {
        let s = source("s1");
        let fx = fixture(MockRemote::with_items(vec![article(&s, "A", 10)]), SyncConfig::default());
        fx.sync.refresh(true).await.unwrap();

        let next = FeedSync::new(
            fx.remote.clone(),
            fx.kv.clone(),
            fx.notifier.clone(),
            &SyncConfig::default(),
        );
        next.set_subscriptions(vec![s.clone()]);
        assert!(next.hydrate_cached());
        assert_eq!(next.displayed().items()[0].title(), "A");

        fx.remote.push_item(article(&s, "B", 20));
        assert_eq!(
            next.refresh(true).await.unwrap(),
            RefreshOutcome::Loaded { count: 2 }
        );
        assert_eq!(next.displayed().items()[0].title(), "B");
    }

    #[tokio::test]
    async fn test_load_more_after_restoring_cache_fetches_second_page() {
        let s = source("s1");
        let fx = fixture(
            MockRemote::with_items((0..5).map(|i| article(&s, &format!("e{}", i), 100 - i)).collect()),
            page_config(2),
        );
        fx.sync.refresh(false).await.unwrap();

        let next = FeedSync::new(fx.remote.clone(), fx.kv.clone(), fx.notifier.clone(), &page_config(2));
        next.set_subscriptions(vec![s.clone()]);
        assert!(next.hydrate_cached());
        assert_eq!(next.next_offset(), 2);

        // Startup within the refresh interval
        assert_eq!(next.refresh(false).await.unwrap(), RefreshOutcome::Skipped);
        assert_eq!(
            next.load_more().await.unwrap(),
            LoadMore::Appended {
                count: 2,
                end_of_data: false
            }
        );

        assert_eq!(fx.remote.fetch_calls(), vec![(2, 0, None), (2, 2, None)]);
        let titles: Vec<_> = next.displayed().iter().map(|i| i.title().to_string()).collect();
        assert_eq!(titles, vec!["e0", "e1", "e2", "e3"]);
    }

    #[tokio::test]
    async fn test_failed_filter_switch_keeps_old_filter_and_paging() {
        let a = source("s1");
        let b = source("s2");
        let mut items: Vec<_> = (0..3).map(|i| article(&a, &format!("a{}", i), 100 - i)).collect();
        items.extend((0..3).map(|i| article(&b, &format!("b{}", i), 50 - i)));
        let fx = fixture(MockRemote::with_items(items), page_config(2));
        fx.sync.refresh(true).await.unwrap();

        fx.remote.fail_next_fetch();
        assert!(fx.sync.set_filter(ItemFilter::Source("s2".into())).await.is_err());
        assert_eq!(fx.sync.filter(), ItemFilter::All);
        assert_eq!(fx.sync.next_offset(), 2);

        fx.sync.load_more().await.unwrap();
        let titles: Vec<_> = fx.sync.displayed().iter().map(|i| i.title().to_string()).collect();
        assert_eq!(titles, vec!["a0", "a1", "a2", "b0"]);
        assert_eq!(fx.remote.fetch_calls().last(), Some(&(2, 2, None)));
    }

    #[tokio::test]
    async fn test_remove_subscription_drops_items() {
        let a = source("s1");
        let b = source("s2");
        let fx = fixture(
            MockRemote::with_items(vec![article(&a, "a", 10), article(&b, "b", 9)]),
            SyncConfig::default(),
        );
        fx.sync.refresh(true).await.unwrap();

        fx.sync.remove_subscription("s2");
        assert_eq!(fx.sync.displayed().len(), 1);
        assert_eq!(fx.sync.subscriptions().len(), 1);
    }
}
