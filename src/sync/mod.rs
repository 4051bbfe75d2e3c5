pub mod diff;
pub mod engine;
pub mod pagination;
pub mod refresh_loop;
pub mod snapshot;
pub mod staleness;

pub use diff::{differs, Identity};
pub use engine::{FeedSync, PromotePolicy, RefreshOutcome, LAST_FETCH_KEY, SNAPSHOT_KEY};
pub use pagination::{LoadMore, PageRequest, Paginator, DEFAULT_PAGE_SIZE};
pub use refresh_loop::RefreshLoop;
pub use snapshot::{FetchTicket, Snapshot, SnapshotStore};
pub use staleness::{should_refresh, StalenessPolicy, DEFAULT_REFRESH_INTERVAL};
