//! # feedloop
//!
//! Client-side sync and playback state for a news and podcast reader.
//!
//! ## Architecture
//!
//! ```text
//! RefreshLoop → FeedSync → pending ─promote→ displayed ← load_more
//!                                  Player → ListenStateStore / PlaybackQueue
//! ```
//!
//! Background refreshes only ever write the pending snapshot; the displayed
//! snapshot changes on promotion or by appending further pages. Playback
//! events update listen state and the queue independently of the feed.
//!
//! ## Quick Start
//!
//! ```bash
//! # Subscribe and import some items into the local catalog
//! feedloop subscribe pod.example.com/feed
//! feedloop import items.json
//!
//! # Fetch, then list episodes you have started
//! feedloop refresh
//! feedloop list --filter continue
//!
//! # Keep refreshing every 5 minutes
//! feedloop watch --interval 5m
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Session object and error types
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: TOML configuration
//! - [`domain`]: Items, sources, keys, listen state, filters
//! - [`playback`]: Listen-state store, queue and player
//! - [`remote`]: Contracts for remote services
//! - [`store`]: SQLite persistence
//! - [`sync`]: Snapshots, staleness, pagination and the refresh loop

/// Session object and error handling.
///
/// A [`Session`](app::Session) owns one feed, one player and at most one
/// refresh loop. [`logout`](app::Session::logout) builds a fresh one.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/feedloop/config.toml`, supporting:
/// - Refresh interval, page size and promotion policy
/// - Progress report interval
/// - Database location
pub mod config;

/// Core domain models.
///
/// - [`Item`](domain::Item): Article or episode with a cached stable key
/// - [`Source`](domain::Source): Subscription record
/// - [`ListenState`](domain::ListenState): Position and finished flag
pub mod domain;

/// Playback state.
///
/// - [`ListenStateStore`](playback::ListenStateStore): Stamped per-episode writes
/// - [`PlaybackQueue`](playback::PlaybackQueue): De-duplicated play order
/// - [`Player`](playback::Player): Playback events and remote mirroring
pub mod playback;

/// Contracts for the services the core depends on.
pub mod remote;

/// SQLite persistence layer.
///
/// - [`Store`](store::Store): Trait defining catalog operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation, also usable
///   as a local remote source and key-value store
pub mod store;

/// Feed synchronization.
///
/// - [`FeedSync`](sync::FeedSync): Refresh, promote and load more
/// - [`RefreshLoop`](sync::RefreshLoop): Cancellable background refresh
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;
