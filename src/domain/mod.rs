pub mod feed;
pub mod filter;
pub mod item;
pub mod listen;

pub use feed::{normalize_feed_url, Source};
pub use filter::ItemFilter;
pub use item::{compare_by_published, key_of, sort_by_published, EpisodeKey, Item, Payload};
pub use listen::{format_listen_time, ListenRecord, ListenState};
