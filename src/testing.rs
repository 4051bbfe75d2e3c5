//! Fixtures and scripted collaborators shared by unit tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::app::{FeedloopError, Result};
use crate::domain::{sort_by_published, EpisodeKey, Item, ListenRecord, Payload, Source};
use crate::remote::{FetchedPage, ListenRemote, Notifier, RemoteSource};

pub fn source(id: &str) -> Source {
    Source::new(id, format!("https://{}.example.com/feed", id), format!("{} feed", id))
}

pub fn article(source: &Source, title: &str, secs: i64) -> Item {
    article_at(
        source,
        title,
        secs,
        &format!("https://example.com/{}/{}", source.id, title),
    )
}

pub fn article_at(source: &Source, title: &str, secs: i64, url: &str) -> Item {
    Item::new(
        source,
        title,
        Utc.timestamp_opt(secs, 0).unwrap(),
        Payload::article(url),
    )
}

pub fn episode(source: &Source, title: &str, secs: i64) -> Item {
    Item::new(
        source,
        title,
        Utc.timestamp_opt(secs, 0).unwrap(),
        Payload::episode(format!("https://cdn.example.com/{}/{}.mp3", source.id, title)),
    )
}

/// `(limit, offset, scope)` of one `fetch_items` call.
pub type FetchCall = (usize, usize, Option<String>);

/// In-memory remote whose contents and failures are scripted by the test.
#[derive(Default)]
pub struct MockRemote {
    items: Mutex<Vec<Item>>,
    sources: Mutex<Vec<Source>>,
    calls: Mutex<Vec<FetchCall>>,
    failed_sources: Mutex<Vec<String>>,
    fail_fetch: AtomicBool,
    fail_create: AtomicBool,
    listen: Mutex<Vec<ListenRecord>>,
    writes: Mutex<Vec<(EpisodeKey, Option<f64>)>>,
    fail_listen: AtomicBool,
}

impl MockRemote {
    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Self::default()
        }
    }

    pub fn push_item(&self, item: Item) {
        self.items.lock().unwrap().push(item);
    }

    pub fn set_sources(&self, sources: Vec<Source>) {
        *self.sources.lock().unwrap() = sources;
    }

    pub fn fetch_calls(&self) -> Vec<FetchCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_failed_sources(&self, failed: Vec<String>) {
        *self.failed_sources.lock().unwrap() = failed;
    }

    /// The next `fetch_items` call fails with a transient error.
    pub fn fail_next_fetch(&self) {
        self.fail_fetch.store(true, Ordering::SeqCst);
    }

    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn seed_listen_state(&self, key: &str, position_secs: f64, finished: bool) {
        self.listen.lock().unwrap().push(ListenRecord {
            key: EpisodeKey::from(key),
            position_secs,
            finished,
        });
    }

    pub fn listen_states_snapshot(&self) -> Vec<ListenRecord> {
        self.listen.lock().unwrap().clone()
    }

    /// Successful writes: `Some(position)` or `None` for "finished".
    pub fn listen_writes(&self) -> Vec<(EpisodeKey, Option<f64>)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn fail_listen_writes(&self, fail: bool) {
        self.fail_listen.store(fail, Ordering::SeqCst);
    }

    fn write_listen(&self, key: &EpisodeKey, position: Option<f64>) -> Result<()> {
        if self.fail_listen.load(Ordering::SeqCst) {
            return Err(FeedloopError::Remote("listen store unavailable".into()));
        }
        self.writes.lock().unwrap().push((key.clone(), position));
        let record = ListenRecord {
            key: key.clone(),
            position_secs: position.unwrap_or(0.0),
            finished: position.is_none(),
        };
        let mut listen = self.listen.lock().unwrap();
        match listen.iter_mut().find(|r| &r.key == key) {
            Some(existing) => *existing = record,
            None => listen.push(record),
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteSource for MockRemote {
    async fn fetch_items(
        &self,
        subscriptions: &[Source],
        limit: usize,
        offset: usize,
        scope: Option<&str>,
    ) -> Result<FetchedPage> {
        self.calls
            .lock()
            .unwrap()
            .push((limit, offset, scope.map(str::to_string)));

        if self.fail_fetch.swap(false, Ordering::SeqCst) {
            return Err(FeedloopError::Remote("connection reset".into()));
        }

        let mut items: Vec<Item> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| subscriptions.iter().any(|s| s.id == item.source_id()))
            .filter(|item| scope.map_or(true, |id| item.source_id() == id))
            .cloned()
            .collect();
        sort_by_published(&mut items);

        Ok(FetchedPage {
            items: items.into_iter().skip(offset).take(limit).collect(),
            failed_sources: self.failed_sources.lock().unwrap().clone(),
        })
    }

    async fn fetch_subscriptions(&self) -> Result<Vec<Source>> {
        Ok(self.sources.lock().unwrap().clone())
    }

    async fn create_subscription(&self, url: &str) -> Result<Source> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(FeedloopError::Remote("not a feed".into()));
        }
        let mut sources = self.sources.lock().unwrap();
        let source = Source::new(format!("src-{}", sources.len() + 1), url, url);
        sources.push(source.clone());
        Ok(source)
    }

    async fn delete_subscription(&self, id: &str) -> Result<()> {
        let mut sources = self.sources.lock().unwrap();
        let before = sources.len();
        sources.retain(|s| s.id != id);
        if sources.len() == before {
            return Err(FeedloopError::SourceNotFound(id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ListenRemote for MockRemote {
    async fn get_listen_states(&self) -> Result<Vec<ListenRecord>> {
        Ok(self.listen.lock().unwrap().clone())
    }

    async fn set_listen_position(&self, key: &EpisodeKey, position_secs: f64) -> Result<()> {
        self.write_listen(key, Some(position_secs))
    }

    async fn set_listen_finished(&self, key: &EpisodeKey) -> Result<()> {
        self.write_listen(key, None)
    }
}

/// Notifier that keeps every message for later assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
