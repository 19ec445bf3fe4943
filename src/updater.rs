//! Background schedule refresh.

use std::time::Duration;

use lolcal_core::client::ScheduleApi;
use lolcal_core::sync::Synchronizer;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Run one sync pass immediately, then one per interval. A failed pass is
/// logged and retried at the next tick; the loop never dies with it.
pub fn spawn(sync: Synchronizer<ScheduleApi>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match sync.sync_all().await {
                Ok(stats) => info!(
                    leagues = stats.leagues,
                    matches = stats.matches,
                    skipped = stats.skipped,
                    "schedule refresh complete"
                ),
                Err(err) => error!(%err, "schedule refresh failed"),
            }
        }
    })
}
