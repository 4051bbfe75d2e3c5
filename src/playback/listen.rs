use std::collections::HashMap;

use tracing::debug;

use crate::domain::{EpisodeKey, Item, ListenRecord, ListenState};

/// Monotonic sequence attached to every listen-state write.
///
/// Hydrated records carry `WriteStamp::REMOTE`, which loses to any local write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WriteStamp(u64);

impl WriteStamp {
    pub const REMOTE: WriteStamp = WriteStamp(0);
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    state: ListenState,
    stamp: WriteStamp,
}

/// Per-episode playback position and finished flag.
///
/// A key missing from the map is unstarted. Entries are never removed.
#[derive(Debug, Default)]
pub struct ListenStateStore {
    entries: HashMap<EpisodeKey, Entry>,
    clock: u64,
}

impl ListenStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge records loaded from the remote mirror. Keys written locally
    /// since the session started keep their local value.
    pub fn hydrate(&mut self, records: impl IntoIterator<Item = ListenRecord>) {
        let mut applied = 0;
        for record in records {
            if self.apply(record.key.clone(), record.state(), WriteStamp::REMOTE) {
                applied += 1;
            }
        }
        debug!("Hydrated {} listen states", applied);
    }

    /// Reserve a stamp for a write that will be applied later, such as a
    /// progress report captured before an await.
    pub fn stamp(&mut self) -> WriteStamp {
        self.clock += 1;
        WriteStamp(self.clock)
    }

    /// Store `state` unless a newer write for `key` is already present.
    pub fn apply(&mut self, key: EpisodeKey, state: ListenState, stamp: WriteStamp) -> bool {
        if let Some(current) = self.entries.get(&key) {
            if stamp < current.stamp {
                debug!("Rejecting stale listen write for {}", key);
                return false;
            }
        }
        self.entries.insert(key, Entry { state, stamp });
        true
    }

    pub fn apply_progress(&mut self, key: &EpisodeKey, position_secs: f64, stamp: WriteStamp) -> bool {
        self.apply(key.clone(), ListenState::in_progress(position_secs), stamp)
    }

    pub fn record_progress(&mut self, key: &EpisodeKey, position_secs: f64) -> ListenState {
        let stamp = self.stamp();
        self.apply_progress(key, position_secs, stamp);
        self.state(key)
    }

    pub fn mark_finished(&mut self, key: &EpisodeKey) -> ListenState {
        let stamp = self.stamp();
        self.apply(key.clone(), ListenState::finished(), stamp);
        self.state(key)
    }

    pub fn mark_unplayed(&mut self, key: &EpisodeKey) -> ListenState {
        let stamp = self.stamp();
        self.apply(key.clone(), ListenState::unplayed(), stamp);
        self.state(key)
    }

    pub fn toggle_finished(&mut self, key: &EpisodeKey) -> ListenState {
        if self.state(key).finished {
            self.mark_unplayed(key)
        } else {
            self.mark_finished(key)
        }
    }

    pub fn get(&self, key: &EpisodeKey) -> Option<ListenState> {
        self.entries.get(key).map(|e| e.state)
    }

    /// State for `key`, treating unstarted as position 0.
    pub fn state(&self, key: &EpisodeKey) -> ListenState {
        self.get(key).unwrap_or_default()
    }

    /// State recorded for `item`. Items without a server id also match
    /// records stored under the `feed - title` key older clients wrote.
    pub fn get_for(&self, item: &Item) -> Option<ListenState> {
        self.get(item.key()).or_else(|| {
            if item.id().is_some() {
                return None;
            }
            self.get(&EpisodeKey::legacy(item.source_title(), item.title()))
        })
    }

    pub fn state_for(&self, item: &Item) -> ListenState {
        self.get_for(item).unwrap_or_default()
    }

    pub fn is_unlistened(&self, key: &EpisodeKey) -> bool {
        self.state(key).is_unlistened()
    }

    pub fn is_in_progress(&self, key: &EpisodeKey) -> bool {
        self.state(key).is_in_progress()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EpisodeKey, ListenState)> {
        self.entries.iter().map(|(k, e)| (k, e.state))
    }
}
