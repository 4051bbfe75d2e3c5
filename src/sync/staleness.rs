use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// `now - last_fetch > interval`; a missing `last_fetch` is always stale.
pub fn should_refresh(
    now: DateTime<Utc>,
    last_fetch: Option<DateTime<Utc>>,
    interval: Duration,
) -> bool {
    match last_fetch {
        None => true,
        Some(last) => {
            let interval = TimeDelta::from_std(interval).unwrap_or(TimeDelta::MAX);
            now.signed_duration_since(last) > interval
        }
    }
}

/// Gates background refreshes on time since the last successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
    interval: Duration,
}

impl StalenessPolicy {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn should_refresh(&self, now: DateTime<Utc>, last_fetch: Option<DateTime<Utc>>) -> bool {
        should_refresh(now, last_fetch, self.interval)
    }
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_INTERVAL)
    }
}
