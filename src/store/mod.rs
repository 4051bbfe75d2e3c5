pub mod sqlite;

use crate::app::Result;
use crate::domain::{EpisodeKey, Item, ListenRecord, Source};
use crate::remote::FetchedPage;

pub use sqlite::SqliteStore;

/// Most recent listen states returned to a session on start.
pub const LISTEN_STATE_LIMIT: usize = 500;

pub trait Store {
    // Source operations
    fn add_source(&self, source: &Source) -> Result<bool>;
    fn get_source(&self, id: &str) -> Result<Option<Source>>;
    fn get_source_by_url(&self, url: &str) -> Result<Option<Source>>;
    fn get_all_sources(&self) -> Result<Vec<Source>>;
    fn delete_source(&self, id: &str) -> Result<()>;

    // Item operations
    fn add_items(&self, items: &[Item]) -> Result<usize>;
    fn get_items_page(
        &self,
        source_ids: &[&str],
        limit: usize,
        offset: usize,
    ) -> Result<FetchedPage>;
    fn item_count(&self) -> Result<usize>;

    // Listen state operations
    fn get_listen_records(&self, limit: usize) -> Result<Vec<ListenRecord>>;
    fn put_listen_record(&self, key: &EpisodeKey, position_secs: f64, finished: bool) -> Result<()>;
}
