use std::collections::VecDeque;

use tracing::debug;

use crate::domain::{EpisodeKey, Item};

/// Episodes waiting to play after the current one.
///
/// An item is never queued twice and never queued while it is playing.
#[derive(Debug, Default)]
pub struct PlaybackQueue {
    items: VecDeque<Item>,
    now_playing: Option<Item>,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &EpisodeKey) -> bool {
        self.items.iter().any(|item| item.key() == key)
    }

    pub fn is_playing(&self, key: &EpisodeKey) -> bool {
        self.now_playing.as_ref().is_some_and(|item| item.key() == key)
    }

    fn accepts(&self, item: &Item) -> bool {
        let key = item.key();
        if self.is_playing(key) || self.contains(key) {
            debug!("Not queueing {}: already queued or playing", item.title());
            return false;
        }
        true
    }

    /// "Add to Queue": append at the tail.
    pub fn enqueue(&mut self, item: Item) -> bool {
        if !self.accepts(&item) {
            return false;
        }
        self.items.push_back(item);
        true
    }

    /// "Play Next": insert at the head.
    pub fn play_next(&mut self, item: Item) -> bool {
        if !self.accepts(&item) {
            return false;
        }
        self.items.push_front(item);
        true
    }

    pub fn dequeue_next(&mut self) -> Option<Item> {
        self.items.pop_front()
    }

    /// Drop every entry with `key`. Removing an absent key is a no-op.
    pub fn remove(&mut self, key: &EpisodeKey) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.key() != key);
        self.items.len() != before
    }

    /// Remove when queued, otherwise enqueue. Returns whether it is now queued.
    pub fn toggle(&mut self, item: Item) -> bool {
        if self.remove(item.key()) {
            return false;
        }
        self.enqueue(item)
    }

    pub fn now_playing(&self) -> Option<&Item> {
        self.now_playing.as_ref()
    }

    /// Start playing `item`; it leaves the queue if it was waiting there.
    pub fn set_now_playing(&mut self, item: Option<Item>) {
        if let Some(item) = &item {
            self.remove(item.key());
        }
        self.now_playing = item;
    }

    /// Move the head of the queue into "now playing".
    pub fn advance(&mut self) -> Option<&Item> {
        self.now_playing = self.dequeue_next();
        self.now_playing.as_ref()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
