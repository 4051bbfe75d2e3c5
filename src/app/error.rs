use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedloopError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FeedloopError>;

/// Build the single toast shown when some sources failed during a refresh.
///
/// Returns `None` when nothing failed so callers can skip notifying.
pub fn aggregate_source_failures(failed: &[String]) -> Option<String> {
    match failed {
        [] => None,
        [one] => Some(format!("Failed to refresh 1 source: {}", one)),
        many => Some(format!(
            "Failed to refresh {} sources: {}",
            many.len(),
            many.join(", ")
        )),
    }
}
