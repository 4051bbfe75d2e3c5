use serde::Deserialize;

use crate::domain::Item;

/// Field used to decide whether two items at the same position match.
/// Titles are not unique, so they are never an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Identity {
    /// Article URL or audio URL.
    #[default]
    Location,
    /// Server id, falling back to the item key when absent.
    Id,
}

impl Identity {
    pub fn of<'a>(&self, item: &'a Item) -> &'a str {
        match self {
            Identity::Location => item.location(),
            Identity::Id => item.id().unwrap_or_else(|| item.key().as_str()),
        }
    }
}

/// Whether the head of `pending` differs from `displayed`.
///
/// Compares position by position over the shorter list and stops at the
/// first mismatch. An empty side differs only when the other is non-empty.
pub fn differs(displayed: &[Item], pending: &[Item], identity: Identity) -> bool {
    if displayed.is_empty() || pending.is_empty() {
        return displayed.is_empty() != pending.is_empty();
    }
    displayed
        .iter()
        .zip(pending)
        .any(|(a, b)| identity.of(a) != identity.of(b))
}
