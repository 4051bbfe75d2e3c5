use serde::{Deserialize, Serialize};

use crate::domain::EpisodeKey;

/// Playback progress and completion for one episode.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ListenState {
    pub position_secs: f64,
    pub finished: bool,
}

impl ListenState {
    pub fn in_progress(position_secs: f64) -> Self {
        Self {
            position_secs: sanitize_position(position_secs),
            finished: false,
        }
    }

    pub fn finished() -> Self {
        Self {
            position_secs: 0.0,
            finished: true,
        }
    }

    pub fn unplayed() -> Self {
        Self::default()
    }

    pub fn is_unlistened(&self) -> bool {
        !self.finished && self.position_secs == 0.0
    }

    pub fn is_in_progress(&self) -> bool {
        self.position_secs > 0.0 && !self.finished
    }

    /// Short status shown next to an episode.
    pub fn label(&self) -> Option<String> {
        if self.finished {
            Some("Finished".to_string())
        } else if self.position_secs > 0.0 {
            Some(format!("Continue from {}", format_listen_time(self.position_secs)))
        } else {
            None
        }
    }
}

/// Listen state row as stored by the remote side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenRecord {
    pub key: EpisodeKey,
    pub position_secs: f64,
    pub finished: bool,
}

impl ListenRecord {
    pub fn state(&self) -> ListenState {
        ListenState {
            position_secs: sanitize_position(self.position_secs),
            finished: self.finished,
        }
    }
}

/// Positions are non-negative; anything else collapses to the start.
pub(crate) fn sanitize_position(position_secs: f64) -> f64 {
    if position_secs.is_finite() && position_secs > 0.0 {
        position_secs
    } else {
        0.0
    }
}

/// Format seconds as `h:mm:ss`, or `0:00` for nothing listened.
pub fn format_listen_time(seconds: f64) -> String {
    if seconds.is_nan() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{}:{:02}:{:02}", hours, minutes, secs)
}
