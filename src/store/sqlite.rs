use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use rusqlite_migration::{Migrations, M};
use sha2::{Digest, Sha256};
use tracing::warn;
use url::Url;

use crate::app::{FeedloopError, Result};
use crate::domain::{EpisodeKey, Item, ListenRecord, Source};
use crate::remote::{FetchedPage, KeyValueStore, ListenRemote, RemoteSource};
use crate::store::{Store, LISTEN_STATE_LIMIT};

/// Local catalog of sources, items and listen states, plus the key-value
/// table a session persists into.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            FeedloopError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        migrations
            .to_latest(&mut conn)
            .map_err(|_| FeedloopError::Database(rusqlite::Error::InvalidQuery))?;

        Ok(())
    }

    fn timestamp() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Source id derived from the feed URL, so re-subscribing is stable.
    pub fn source_id_for(url: &str) -> String {
        let digest = hex::encode(Sha256::digest(url.as_bytes()));
        digest[..16].to_string()
    }

    fn row_to_source(row: &rusqlite::Row<'_>) -> rusqlite::Result<Source> {
        Ok(Source {
            id: row.get(0)?,
            url: row.get(1)?,
            title: row.get(2)?,
            icon_url: row.get(3)?,
        })
    }
}

impl Store for SqliteStore {
    fn add_source(&self, source: &Source) -> Result<bool> {
        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO sources (id, url, title, icon_url, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                source.id,
                source.url,
                source.title,
                source.icon_url,
                Self::timestamp()
            ],
        )?;
        Ok(inserted > 0)
    }

    fn get_source(&self, id: &str) -> Result<Option<Source>> {
        let conn = self.conn()?;
        let result = conn
            .query_row(
                "SELECT id, url, title, icon_url FROM sources WHERE id = ?1",
                params![id],
                Self::row_to_source,
            )
            .optional()?;
        Ok(result)
    }

    fn get_source_by_url(&self, url: &str) -> Result<Option<Source>> {
        let conn = self.conn()?;
        let result = conn
            .query_row(
                "SELECT id, url, title, icon_url FROM sources WHERE url = ?1",
                params![url],
                Self::row_to_source,
            )
            .optional()?;
        Ok(result)
    }

    fn get_all_sources(&self) -> Result<Vec<Source>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, url, title, icon_url FROM sources ORDER BY title, url")?;
        let sources = stmt
            .query_map([], Self::row_to_source)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(sources)
    }

    fn delete_source(&self, id: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM sources WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Insert items, skipping keys already present. Every item's source must
    /// exist.
    fn add_items(&self, items: &[Item]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut count = 0;

        for item in items {
            let known: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM sources WHERE id = ?1)",
                params![item.source_id()],
                |row| row.get(0),
            )?;
            if !known {
                return Err(FeedloopError::SourceNotFound(item.source_id().to_string()));
            }

            count += tx.execute(
                "INSERT OR IGNORE INTO items (item_key, source_id, title, published_at, data)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    item.key().as_str(),
                    item.source_id(),
                    item.title(),
                    item.published_at().to_rfc3339_opts(SecondsFormat::Millis, true),
                    serde_json::to_string(item)?
                ],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }

    /// Newest first; items published at the same instant keep insertion
    /// order. Rows that no longer decode are skipped and their source is
    /// reported as failed.
    fn get_items_page(
        &self,
        source_ids: &[&str],
        limit: usize,
        offset: usize,
    ) -> Result<FetchedPage> {
        if source_ids.is_empty() || limit == 0 {
            return Ok(FetchedPage::default());
        }

        let placeholders: Vec<String> = (1..=source_ids.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "SELECT i.data, s.title FROM items i
             JOIN sources s ON s.id = i.source_id
             WHERE i.source_id IN ({})
             ORDER BY i.published_at DESC, i.seq ASC
             LIMIT ?{} OFFSET ?{}",
            placeholders.join(", "),
            source_ids.len() + 1,
            source_ids.len() + 2,
        );

        let mut values: Vec<Value> = source_ids
            .iter()
            .map(|id| Value::Text((*id).to_string()))
            .collect();
        values.push(Value::Integer(limit as i64));
        values.push(Value::Integer(offset as i64));

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut page = FetchedPage::default();
        for (data, source_title) in rows {
            match serde_json::from_str::<Item>(&data) {
                Ok(item) => page.items.push(item),
                Err(e) => {
                    warn!("Skipping unreadable item from {}: {}", source_title, e);
                    if !page.failed_sources.contains(&source_title) {
                        page.failed_sources.push(source_title);
                    }
                }
            }
        }
        Ok(page)
    }

    fn item_count(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn get_listen_records(&self, limit: usize) -> Result<Vec<ListenRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT item_key, position_secs, finished FROM listen_states
             ORDER BY updated_at DESC LIMIT ?1",
        )?;
        let records = stmt
            .query_map(params![limit as i64], |row| {
                Ok(ListenRecord {
                    key: EpisodeKey::new(row.get::<_, String>(0)?),
                    position_secs: row.get(1)?,
                    finished: row.get::<_, i32>(2)? != 0,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn put_listen_record(&self, key: &EpisodeKey, position_secs: f64, finished: bool) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO listen_states (item_key, position_secs, finished, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(item_key) DO UPDATE SET position_secs = ?2, finished = ?3, updated_at = ?4",
            params![key.as_str(), position_secs, finished as i32, Self::timestamp()],
        )?;
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[async_trait]
impl RemoteSource for SqliteStore {
    async fn fetch_items(
        &self,
        subscriptions: &[Source],
        limit: usize,
        offset: usize,
        scope: Option<&str>,
    ) -> Result<FetchedPage> {
        let ids: Vec<&str> = subscriptions
            .iter()
            .map(|s| s.id.as_str())
            .filter(|id| scope.map_or(true, |wanted| *id == wanted))
            .collect();
        self.get_items_page(&ids, limit, offset)
    }

    async fn fetch_subscriptions(&self) -> Result<Vec<Source>> {
        self.get_all_sources()
    }

    async fn create_subscription(&self, url: &str) -> Result<Source> {
        if let Some(existing) = self.get_source_by_url(url)? {
            return Ok(existing);
        }
        let parsed = Url::parse(url)?;
        let title = parsed.host_str().unwrap_or(url).to_string();
        let source = Source::new(Self::source_id_for(url), url, title);
        self.add_source(&source)?;
        Ok(source)
    }

    async fn delete_subscription(&self, id: &str) -> Result<()> {
        if self.get_source(id)?.is_none() {
            return Err(FeedloopError::SourceNotFound(id.to_string()));
        }
        self.delete_source(id)
    }
}

#[async_trait]
impl ListenRemote for SqliteStore {
    async fn get_listen_states(&self) -> Result<Vec<ListenRecord>> {
        self.get_listen_records(LISTEN_STATE_LIMIT)
    }

    async fn set_listen_position(&self, key: &EpisodeKey, position_secs: f64) -> Result<()> {
        self.put_listen_record(key, position_secs, false)
    }

    async fn set_listen_finished(&self, key: &EpisodeKey) -> Result<()> {
        self.put_listen_record(key, 0.0, true)
    }
}
