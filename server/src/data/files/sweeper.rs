//! Periodic expiry sweep
//!
//! Runs outside the request path with its own error isolation. The default
//! schedule fires at every local midnight; deployments (and tests) can
//! replace it with a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Local};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::FileService;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Spawn the expiry sweep task
pub fn start_sweep_task(
    files: Arc<FileService>,
    interval_secs: Option<u64>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let delay = match interval_secs {
                Some(secs) => Duration::from_secs(secs),
                None => until_next_local_midnight(),
            };

            tokio::select! {
                biased;
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        tracing::debug!("Expiry sweep task shutting down");
                        break;
                    }
                }
                _ = tokio::time::sleep(delay) => {
                    match files.sweep_expired().await {
                        Ok(swept) => tracing::debug!(swept, "Expiry sweep finished"),
                        Err(e) => tracing::warn!(error = %e, "Expiry sweep failed"),
                    }
                }
            }
        }
    })
}

/// Time until the next local midnight, falling back to a flat day when the
/// local timezone has no representable midnight (DST edge).
fn until_next_local_midnight() -> Duration {
    let now = Local::now();
    let next_day = (now + ChronoDuration::days(1)).date_naive();
    match next_day
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
    {
        Some(next) => (next - now).to_std().unwrap_or(DAY),
        None => DAY,
    }
}
