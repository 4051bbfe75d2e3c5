use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::Source;

/// Key used to look up listen state and queue membership for an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpisodeKey(String);

impl EpisodeKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Composite `feed - title` key used by legacy records.
    pub fn legacy(source_title: &str, title: &str) -> Self {
        Self(format!("{} - {}", source_title, title))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EpisodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EpisodeKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EpisodeKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Type-specific part of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Article {
        url: String,
    },
    Episode {
        audio_url: String,
        description: Option<String>,
        image_url: Option<String>,
    },
}

impl Payload {
    pub fn article(url: impl Into<String>) -> Self {
        Payload::Article { url: url.into() }
    }

    pub fn episode(audio_url: impl Into<String>) -> Self {
        Payload::Episode {
            audio_url: audio_url.into(),
            description: None,
            image_url: None,
        }
    }

    /// Where the content lives: the article page or the audio file.
    pub fn location(&self) -> &str {
        match self {
            Payload::Article { url } => url,
            Payload::Episode { audio_url, .. } => audio_url,
        }
    }
}

/// A fetched article or podcast episode. Never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    id: Option<String>,
    title: String,
    published_at: DateTime<Utc>,
    source_id: String,
    source_title: String,
    payload: Payload,
    #[serde(skip)]
    key: OnceLock<EpisodeKey>,
}

impl Item {
    pub fn new(
        source: &Source,
        title: impl Into<String>,
        published_at: DateTime<Utc>,
        payload: Payload,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            published_at,
            source_id: source.id.clone(),
            source_title: source.title.clone(),
            payload,
            key: OnceLock::new(),
        }
    }

    /// Attach the server-assigned identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self.key = OnceLock::new();
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn source_title(&self) -> &str {
        &self.source_title
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn location(&self) -> &str {
        self.payload.location()
    }

    pub fn is_episode(&self) -> bool {
        matches!(self.payload, Payload::Episode { .. })
    }

    /// Stable key, computed on first use and cached.
    ///
    /// Server id when present, else a hash of (source id, content location),
    /// else the legacy `feed - title` composite.
    pub fn key(&self) -> &EpisodeKey {
        self.key.get_or_init(|| {
            if let Some(id) = &self.id {
                return EpisodeKey::new(id.clone());
            }
            let location = self.payload.location();
            if !location.is_empty() {
                return EpisodeKey::new(Self::content_hash(&self.source_id, location));
            }
            EpisodeKey::legacy(&self.source_title, &self.title)
        })
    }

    /// Deterministic fallback key from the parent source and content location.
    pub fn content_hash(source_id: &str, location: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source_id.as_bytes());
        hasher.update([0u8]);
        hasher.update(location.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.published_at == other.published_at
            && self.source_id == other.source_id
            && self.source_title == other.source_title
            && self.payload == other.payload
    }
}

/// Pure, total key derivation for an item.
pub fn key_of(item: &Item) -> EpisodeKey {
    item.key().clone()
}

/// Newest first. Equal timestamps compare equal so stable sorts keep
/// insertion order for ties.
pub fn compare_by_published(a: &Item, b: &Item) -> Ordering {
    b.published_at.cmp(&a.published_at)
}

pub fn sort_by_published(items: &mut [Item]) {
    // slice::sort_by is stable
    items.sort_by(compare_by_published);
}
