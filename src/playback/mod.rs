pub mod listen;
pub mod player;
pub mod queue;

pub use listen::{ListenStateStore, WriteStamp};
pub use player::{Player, DEFAULT_PROGRESS_INTERVAL};
pub use queue::PlaybackQueue;
