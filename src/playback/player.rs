use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::app::Result;
use crate::domain::{EpisodeKey, Item, ListenState};
use crate::playback::{ListenStateStore, PlaybackQueue};
use crate::remote::ListenRemote;

pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy)]
enum RemoteWrite {
    Position(f64),
    Finished,
}

/// Ties the listen-state store and queue to playback events.
///
/// Local state is authoritative. Every change is mirrored to the remote
/// listen-state store on a best-effort basis; a failed write is logged and
/// never interrupts playback.
pub struct Player {
    listen: ListenStateStore,
    queue: PlaybackQueue,
    remote: Arc<dyn ListenRemote>,
    progress_interval: Duration,
    last_reported: Option<f64>,
}

impl Player {
    pub fn new(remote: Arc<dyn ListenRemote>, progress_interval: Duration) -> Self {
        Self {
            listen: ListenStateStore::new(),
            queue: PlaybackQueue::new(),
            remote,
            progress_interval,
            last_reported: None,
        }
    }

    pub fn listen(&self) -> &ListenStateStore {
        &self.listen
    }

    pub fn queue(&self) -> &PlaybackQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut PlaybackQueue {
        &mut self.queue
    }

    pub fn now_playing(&self) -> Option<&Item> {
        self.queue.now_playing()
    }

    /// Load listen states from the remote mirror.
    pub async fn hydrate(&mut self) -> Result<usize> {
        let records = self.remote.get_listen_states().await?;
        let count = records.len();
        self.listen.hydrate(records);
        Ok(count)
    }

    async fn mirror(&self, key: &EpisodeKey, write: RemoteWrite) {
        let result = match write {
            RemoteWrite::Position(secs) => self.remote.set_listen_position(key, secs).await,
            RemoteWrite::Finished => self.remote.set_listen_finished(key).await,
        };
        if let Err(e) = result {
            warn!("Could not save listen state for {}: {}", key, e);
        }
    }

    /// Start `item` and return the position to seek to.
    pub fn play(&mut self, item: Item) -> f64 {
        let state = self.listen.state_for(&item);
        info!("Playing {}", item.title());
        self.queue.set_now_playing(Some(item));
        self.last_reported = None;
        if state.finished {
            0.0
        } else {
            state.position_secs
        }
    }

    pub fn stop(&mut self) {
        self.queue.set_now_playing(None);
        self.last_reported = None;
    }

    /// Called on every time update from the audio layer. Reports progress
    /// once at least one progress interval has elapsed since the last report.
    pub async fn on_time_update(&mut self, position_secs: f64) -> bool {
        let due = match self.last_reported {
            None => true,
            Some(last) => {
                (position_secs - last).abs() >= self.progress_interval.as_secs_f64()
            }
        };
        if !due {
            return false;
        }
        self.report_progress(position_secs).await
    }

    /// Report the current position immediately, e.g. on pause or seek.
    pub async fn report_progress(&mut self, position_secs: f64) -> bool {
        let Some(key) = self.queue.now_playing().map(|item| item.key().clone()) else {
            return false;
        };
        self.last_reported = Some(position_secs);
        self.record_progress(&key, position_secs).await;
        true
    }

    pub async fn record_progress(&mut self, key: &EpisodeKey, position_secs: f64) -> ListenState {
        let state = self.listen.record_progress(key, position_secs);
        self.mirror(key, RemoteWrite::Position(state.position_secs)).await;
        state
    }

    pub async fn mark_finished(&mut self, key: &EpisodeKey) -> ListenState {
        let state = self.listen.mark_finished(key);
        self.mirror(key, RemoteWrite::Finished).await;
        state
    }

    /// "Mark played" / "Mark unplayed".
    pub async fn toggle_finished(&mut self, key: &EpisodeKey) -> ListenState {
        let state = self.listen.toggle_finished(key);
        let write = if state.finished {
            RemoteWrite::Finished
        } else {
            RemoteWrite::Position(0.0)
        };
        self.mirror(key, write).await;
        state
    }

    /// Natural end of playback: mark the episode finished and move to the
    /// next queued one, which starts from 0.
    pub async fn on_ended(&mut self) -> Option<Item> {
        if let Some(key) = self.queue.now_playing().map(|item| item.key().clone()) {
            self.mark_finished(&key).await;
        }
        self.last_reported = None;
        let next = self.queue.advance().cloned();
        match &next {
            Some(item) => info!("Advancing to {}", item.title()),
            None => debug!("Queue empty, playback stopped"),
        }
        next
    }
}
