use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{sort_by_published, Item};

/// An ordered, immutable list of items from one fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    items: Vec<Item>,
}

impl Snapshot {
    /// Build a snapshot, newest first with ties kept in fetch order.
    pub fn new(mut items: Vec<Item>) -> Self {
        sort_by_published(&mut items);
        Self { items }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// A new snapshot with `page` after the current items. The current items
    /// are an exact prefix of the result.
    pub fn appended(&self, mut page: Vec<Item>) -> Self {
        sort_by_published(&mut page);
        let mut items = Vec::with_capacity(self.items.len() + page.len());
        items.extend_from_slice(&self.items);
        items.extend(page);
        Self { items }
    }

    pub fn without_source(&self, source_id: &str) -> Self {
        Self {
            items: self
                .items
                .iter()
                .filter(|item| item.source_id() != source_id)
                .cloned()
                .collect(),
        }
    }

    /// Same items by key in the same order.
    pub fn same_items(&self, other: &Snapshot) -> bool {
        self.items.len() == other.items.len()
            && self
                .items
                .iter()
                .zip(&other.items)
                .all(|(a, b)| a.key() == b.key())
    }
}

/// Ticket handed out when a fetch for the pending snapshot starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

#[derive(Debug, Default)]
struct Slots {
    displayed: Arc<Snapshot>,
    pending: Arc<Snapshot>,
    /// Bumped every time `displayed` is replaced wholesale.
    generation: u64,
    latest_ticket: u64,
    loaded: bool,
}

/// Holds the displayed and pending snapshots.
///
/// Every replacement swaps an `Arc`, so readers always get a complete list.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    slots: Mutex<Slots>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn displayed(&self) -> Arc<Snapshot> {
        self.slots().displayed.clone()
    }

    pub fn pending(&self) -> Arc<Snapshot> {
        self.slots().pending.clone()
    }

    pub fn generation(&self) -> u64 {
        self.slots().generation
    }

    /// Whether a fetched snapshot has been shown in this session.
    pub fn has_loaded(&self) -> bool {
        self.slots().loaded
    }

    pub fn set_displayed(&self, snapshot: Snapshot) {
        let mut slots = self.slots();
        slots.displayed = Arc::new(snapshot);
        slots.generation += 1;
    }

    pub fn set_pending(&self, snapshot: Snapshot) {
        self.slots().pending = Arc::new(snapshot);
    }

    /// Show pending. No-op when pending is empty or already displayed.
    pub fn promote(&self) -> bool {
        let mut slots = self.slots();
        if slots.pending.is_empty() || slots.pending.same_items(&slots.displayed) {
            return false;
        }
        slots.displayed = slots.pending.clone();
        slots.generation += 1;
        slots.loaded = true;
        true
    }

    /// First load of a session: displayed takes pending unconditionally.
    pub(crate) fn show_initial(&self) {
        let mut slots = self.slots();
        slots.displayed = slots.pending.clone();
        slots.generation += 1;
        slots.loaded = true;
    }

    /// Start a fetch for pending. Any ticket issued earlier is superseded.
    pub fn begin_fetch(&self) -> FetchTicket {
        let mut slots = self.slots();
        slots.latest_ticket += 1;
        FetchTicket(slots.latest_ticket)
    }

    /// Store a fetch result as pending unless a newer fetch was started.
    pub fn complete_fetch(&self, ticket: FetchTicket, snapshot: Snapshot) -> bool {
        let mut slots = self.slots();
        if ticket.0 != slots.latest_ticket {
            debug!(
                "Discarding superseded fetch {} (latest {})",
                ticket.0, slots.latest_ticket
            );
            return false;
        }
        slots.pending = Arc::new(snapshot);
        true
    }

    /// Install a grown copy of displayed, provided displayed has not been
    /// replaced since `generation` was read.
    pub fn extend_displayed(&self, generation: u64, grown: Snapshot) -> bool {
        let mut slots = self.slots();
        if slots.generation != generation {
            return false;
        }
        slots.displayed = Arc::new(grown);
        true
    }

    /// Drop one source's items from both snapshots.
    pub fn remove_source(&self, source_id: &str) {
        let mut slots = self.slots();
        slots.displayed = Arc::new(slots.displayed.without_source(source_id));
        slots.pending = Arc::new(slots.pending.without_source(source_id));
    }
}
