use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// What subset of the feed the view is showing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ItemFilter {
    #[default]
    All,
    /// A single subscription, narrowed on the remote side.
    Source(String),
    /// Episodes started but not finished.
    Continue,
    /// Episodes never started.
    Unlistened,
    /// Episodes waiting in the playback queue.
    Queue,
}

impl ItemFilter {
    /// Source id to pass to the remote fetch. Listening filters are applied
    /// locally over the unfiltered feed.
    pub fn remote_scope(&self) -> Option<&str> {
        match self {
            ItemFilter::Source(id) => Some(id),
            _ => None,
        }
    }
}

impl FromStr for ItemFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "" | "all" => ItemFilter::All,
            "continue" => ItemFilter::Continue,
            "unlistened" => ItemFilter::Unlistened,
            "queue" => ItemFilter::Queue,
            other => ItemFilter::Source(other.to_string()),
        })
    }
}

impl fmt::Display for ItemFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemFilter::All => f.write_str("all"),
            ItemFilter::Source(id) => f.write_str(id),
            ItemFilter::Continue => f.write_str("continue"),
            ItemFilter::Unlistened => f.write_str("unlistened"),
            ItemFilter::Queue => f.write_str("queue"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_filters() {
        assert_eq!("all".parse::<ItemFilter>().unwrap(), ItemFilter::All);
        assert_eq!("continue".parse::<ItemFilter>().unwrap(), ItemFilter::Continue);
        assert_eq!("queue".parse::<ItemFilter>().unwrap(), ItemFilter::Queue);
        assert_eq!(
            "abc123".parse::<ItemFilter>().unwrap(),
            ItemFilter::Source("abc123".into())
        );
    }

    #[test]
    fn test_only_source_filter_scopes_remote_fetch() {
        assert_eq!(ItemFilter::Source("s1".into()).remote_scope(), Some("s1"));
        assert_eq!(ItemFilter::Unlistened.remote_scope(), None);
        assert_eq!(ItemFilter::All.remote_scope(), None);
    }
}
