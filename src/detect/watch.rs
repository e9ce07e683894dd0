// src/detect/watch.rs
// =============================================================================
// The polling loop around ChangeDetector.
//
// Every interval: fetch the page, hand the body to the detector. A failed
// fetch or an unwritable store only costs that one poll: it is logged, the
// manifest is left alone and the loop waits for the next tick.
// =============================================================================

use super::detector::{ChangeDetector, PollOutcome};
use crate::net::{HttpClient, RequestOptions};
use crate::schedule::{run_every, Clock};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// One fetch + observe cycle. Returns None when the poll was skipped.
pub async fn poll_once<C: Clock + ?Sized>(
    client: &HttpClient,
    options: &RequestOptions,
    detector: &ChangeDetector,
    clock: &C,
) -> Option<PollOutcome> {
    let body = match client.fetch_text(detector.url(), options).await {
        Ok(body) => body,
        Err(error) => {
            warn!(url = %detector.url(), %error, "poll failed, skipping");
            return None;
        }
    };

    match detector.observe(&body, clock.now()) {
        Ok(outcome) => Some(outcome),
        Err(error) => {
            warn!(url = %detector.url(), %error, "could not update change store, skipping");
            None
        }
    }
}

/// Polls until `cancel` fires; returns the number of polls made
pub async fn watch_site<C: Clock + ?Sized>(
    client: &HttpClient,
    options: &RequestOptions,
    detector: &ChangeDetector,
    interval: Duration,
    clock: &C,
    cancel: &CancellationToken,
) -> u64 {
    info!(
        url = %detector.url(),
        interval_secs = interval.as_secs(),
        store = %detector.manifest_path().display(),
        "watching for changes"
    );

    run_every(clock, interval, cancel, move || async move {
        if let Some(PollOutcome::Changed(report)) = poll_once(client, options, detector, clock).await {
            println!("[{}] Changes detected:", report.timestamp.format("%Y-%m-%d %H:%M:%S"));
            for section in &report.changed {
                println!("   Element modified: {section}");
            }
            println!("   Report: {}", report.report_path.display());
        }
    })
    .await
}
