// src/monitor.rs
// =============================================================================
// Uptime polling: one GET per interval, reported as UP (2xx) or DOWN.
//
// The tracker remembers the last status and when it last flipped, so every
// sample prints either a status change or how long the current status has
// lasted. It starts out assuming DOWN, which makes the first UP sample a
// "STATUS CHANGED" line.
// =============================================================================

use crate::net::{HttpClient, RequestOptions};
use crate::schedule::{run_every, Clock};
use chrono::{DateTime, Local};
use std::cell::RefCell;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

/// Per-check timeout, tighter than the client-wide one
pub const CHECK_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct UptimeSample {
    pub checked_at: DateTime<Local>,
    pub up: bool,
    pub status_code: Option<u16>,
}

/// What one sample means relative to the previous ones
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    Changed { up: bool },
    Steady { up: bool, since: chrono::Duration },
}

#[derive(Debug)]
pub struct UptimeTracker {
    previous_up: bool,
    changed_at: DateTime<Local>,
}

impl UptimeTracker {
    pub fn new(started_at: DateTime<Local>) -> Self {
        Self {
            previous_up: false,
            changed_at: started_at,
        }
    }

    pub fn record(&mut self, sample: &UptimeSample) -> StatusLine {
        if sample.up != self.previous_up {
            self.previous_up = sample.up;
            self.changed_at = sample.checked_at;
            StatusLine::Changed { up: sample.up }
        } else {
            StatusLine::Steady {
                up: sample.up,
                since: sample.checked_at - self.changed_at,
            }
        }
    }
}

/// One uptime check. Transport errors count as DOWN.
pub async fn check_status<C: Clock + ?Sized>(
    client: &HttpClient,
    options: &RequestOptions,
    url: &Url,
    clock: &C,
) -> UptimeSample {
    let options = options.clone().with_timeout(CHECK_TIMEOUT);
    let (up, status_code) = match client.send(url, &options).await {
        Ok(response) => {
            let status = response.status();
            (status.is_success(), Some(status.as_u16()))
        }
        Err(error) => {
            warn!(%url, %error, "error checking URL");
            (false, None)
        }
    };

    UptimeSample {
        checked_at: clock.now(),
        up,
        status_code,
    }
}

/// "2d 3h 4m", "3h 4m" or "4m 5s"
pub fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);
    let days = total_seconds / 86_400;
    let hours = total_seconds / 3_600;
    let minutes = total_seconds / 60;

    if days >= 1 {
        format!("{}d {}h {}m", days, hours % 24, minutes % 60)
    } else if hours >= 1 {
        format!("{}h {}m", hours, minutes % 60)
    } else {
        format!("{}m {}s", minutes, total_seconds % 60)
    }
}

fn status_text(up: bool) -> &'static str {
    if up {
        "UP"
    } else {
        "DOWN"
    }
}

/// Polls `url` until `cancel` fires; returns the number of checks made
pub async fn monitor_site<C: Clock + ?Sized>(
    client: &HttpClient,
    options: &RequestOptions,
    url: &Url,
    interval: Duration,
    clock: &C,
    cancel: &CancellationToken,
) -> u64 {
    info!(%url, interval_secs = interval.as_secs(), "starting website monitoring");
    println!("Press Ctrl+C to stop monitoring\n");

    let tracker = RefCell::new(UptimeTracker::new(clock.now()));
    let tracker = &tracker;

    run_every(clock, interval, cancel, move || async move {
        let sample = check_status(client, options, url, clock).await;
        let stamp = sample.checked_at.format("%Y-%m-%d %H:%M:%S");
        let code = sample
            .status_code
            .map(|code| format!(" [HTTP {code}]"))
            .unwrap_or_default();
        match tracker.borrow_mut().record(&sample) {
            StatusLine::Changed { up } => {
                println!("[{stamp}] STATUS CHANGED: Website is now {}{code}", status_text(up));
            }
            StatusLine::Steady { up, since } => {
                println!(
                    "[{stamp}] Website is {} (Duration: {}){code}",
                    status_text(up),
                    format_duration(since)
                );
            }
        }
    })
    .await
}
