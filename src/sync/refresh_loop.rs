use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::format_interval;
use crate::sync::{FeedSync, RefreshOutcome};

/// Messages accepted by a running refresh loop
#[derive(Debug)]
enum LoopMessage {
    /// Restart the timer with a new period
    SetInterval(Duration),
    /// Run a forced refresh right away
    RefreshNow,
    Shutdown,
}

/// Periodically asks a [`FeedSync`] to refresh.
///
/// Each tick goes through the staleness gate, so a tick shortly after a
/// manual refresh does nothing. Dropping the loop cancels it.
pub struct RefreshLoop {
    tx: mpsc::Sender<LoopMessage>,
    handle: Option<JoinHandle<()>>,
}

fn ticker(period: Duration) -> Interval {
    let mut ticker = interval(period.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

impl RefreshLoop {
    /// Spawn the loop on the current tokio runtime. The first tick fires
    /// immediately.
    pub fn spawn(feed: Arc<FeedSync>, period: Duration) -> Self {
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(run(feed, period, rx));
        Self {
            tx,
            handle: Some(handle),
        }
    }

    pub async fn set_interval(&self, period: Duration) {
        if let Err(e) = self.tx.send(LoopMessage::SetInterval(period)).await {
            warn!("Refresh loop is gone, interval not changed: {}", e);
        }
    }

    pub async fn refresh_now(&self) {
        if let Err(e) = self.tx.send(LoopMessage::RefreshNow).await {
            warn!("Refresh loop is gone: {}", e);
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the loop and wait for any refresh in progress to finish.
    pub async fn shutdown(mut self) {
        let _ = self.tx.send(LoopMessage::Shutdown).await;
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Refresh loop ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for RefreshLoop {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn run(feed: Arc<FeedSync>, period: Duration, mut rx: mpsc::Receiver<LoopMessage>) {
    info!("Refresh loop started (every {})", format_interval(period.as_secs()));
    let mut timer = ticker(period);

    loop {
        tokio::select! {
            _ = timer.tick() => {
                tick(&feed, false).await;
            }
            msg = rx.recv() => match msg {
                Some(LoopMessage::SetInterval(period)) => {
                    info!("Refresh interval changed to {}", format_interval(period.as_secs()));
                    feed.set_refresh_interval(period);
                    timer = ticker(period);
                }
                Some(LoopMessage::RefreshNow) => {
                    tick(&feed, true).await;
                }
                Some(LoopMessage::Shutdown) | None => {
                    info!("Refresh loop shutting down");
                    break;
                }
            },
        }
    }
}

async fn tick(feed: &FeedSync, force: bool) {
    match feed.refresh(force).await {
        Ok(RefreshOutcome::Skipped) => {}
        Ok(outcome) => debug!("Background refresh: {:?}", outcome),
        // Already logged and surfaced by FeedSync
        Err(_) => {}
    }
}
