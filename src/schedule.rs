// src/schedule.rs
// =============================================================================
// Fixed-cadence polling used by `monitor` and `watch`.
//
// Time comes from a Clock so the loops can run in tests without waiting for
// real minutes, and the loop stops when its CancellationToken fires (main
// wires that to Ctrl+C). There is no jitter, no backoff and no iteration cap.
//
// Rust concepts:
// - ?Sized bounds: run_every takes a concrete Clock or a `dyn Clock`
// - BoxFuture: lets a trait method return "some future" without generics
// - tokio::select!: wait for whichever of two futures finishes first
// =============================================================================

use chrono::{DateTime, Local};
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Source of wall-clock time and delays
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// The real clock, backed by tokio timers
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        tokio::time::sleep(duration).boxed()
    }
}

/// Calls `tick` immediately and then once per `interval` until cancelled.
///
/// A tick that is already running is allowed to finish; cancellation is
/// observed between ticks and during the wait. Returns the number of ticks.
pub async fn run_every<C, F, Fut>(
    clock: &C,
    interval: Duration,
    cancel: &CancellationToken,
    mut tick: F,
) -> u64
where
    C: Clock + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticks = 0;

    // A token cancelled before we start means no tick at all
    while !cancel.is_cancelled() {
        // Run one poll to completion; it is never interrupted halfway
        tick().await;
        ticks += 1;

        // The tick itself may have been cancelled; don't start a wait then
        if cancel.is_cancelled() {
            break;
        }

        // Wait for the next tick, or stop early on cancellation.
        // `biased` checks cancellation first when both are ready.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = clock.sleep(interval) => {}
        }
    }
    ticks
}

/// Converts a whole-minute interval, falling back to `default` below 1
pub fn interval_minutes(raw: i64, default: u64) -> Duration {
    let minutes = if raw < 1 {
        tracing::warn!(raw, default, "invalid interval, using default");
        default
    } else {
        raw as u64
    };
    Duration::from_secs(minutes.saturating_mul(60))
}

/// Routes Ctrl+C to whichever long-running feature is active.
///
/// main installs a single signal listener for the whole process and calls
/// `interrupt()` on every Ctrl+C. A feature that wants to be stoppable
/// `arm()`s a fresh token before it starts and `disarm()`s it when done.
/// With nothing armed, the listener exits the process instead.
#[derive(Debug, Clone, Default)]
pub struct Interrupts {
    active: Arc<Mutex<Option<CancellationToken>>>,
}

impl Interrupts {
    fn slot(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        // The slot holds a plain Option, so a poisoned lock is still usable
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes a new token the target of the next Ctrl+C
    pub fn arm(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.slot() = Some(token.clone());
        token
    }

    pub fn disarm(&self) {
        self.slot().take();
    }

    /// Cancels the armed token. Returns false when nothing was armed.
    pub fn interrupt(&self) -> bool {
        match self.slot().take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
pub use testing::ManualClock;


#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn test_ticks_until_cancelled() {
        let clock = ManualClock::default().interrupt_on_sleep(4);
        let start = clock.now();
        let count = Cell::new(0);

        let ticks = run_every(&clock, Duration::from_secs(60), clock.token(), || {
            count.set(count.get() + 1);
            async {}
        })
        .await;

        assert_eq!(ticks, 4);
        assert_eq!(count.get(), 4);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(60); 4]);
        assert_eq!(clock.now() - start, chrono::Duration::minutes(4));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_never_ticks() {
        let clock = ManualClock::default();
        clock.token().cancel();

        let count = Cell::new(0);

        let ticks = run_every(&clock, Duration::from_secs(1), clock.token(), || {
            count.set(count.get() + 1);
            async {}
        })
        .await;
        assert_eq!(ticks, 0);
        assert_eq!(count.get(), 0);
    }

    #[tokio::test]
    async fn test_cancel_from_tick_stops_loop() {
        let clock = ManualClock::default();
        let token = CancellationToken::new();
        let count = Cell::new(0);

        let ticks = run_every(&clock, Duration::from_secs(1), &token, || {
            count.set(count.get() + 1);
            if count.get() == 2 {
                token.cancel();
            }
            async {}
        })
        .await;

        assert_eq!(ticks, 2);
        assert_eq!(clock.sleeps().len(), 1);
    }

    #[test]
    fn test_interrupt_cancels_only_the_armed_feature() {
        let interrupts = Interrupts::default();
        // Idle: the caller should fall back to exiting
        assert!(!interrupts.interrupt());

        let first = interrupts.arm();
        assert!(interrupts.interrupt());
        assert!(first.is_cancelled());

        // The first Ctrl+C used up the arming; the next one is idle again
        assert!(!interrupts.interrupt());

        let second = interrupts.arm();
        interrupts.disarm();
        assert!(!interrupts.interrupt());
        assert!(!second.is_cancelled());
    }

    #[test]
    fn test_later_feature_is_still_interruptible() {
        let interrupts = Interrupts::default();
        let watch = interrupts.arm();
        interrupts.interrupt();
        interrupts.disarm();

        let monitor = interrupts.arm();
        assert!(interrupts.interrupt());
        assert!(watch.is_cancelled());
        assert!(monitor.is_cancelled());
    }

    #[test]
    fn test_interval_minutes_falls_back() {
        assert_eq!(interval_minutes(3, 5), Duration::from_secs(180));
        assert_eq!(interval_minutes(0, 5), Duration::from_secs(300));
        assert_eq!(interval_minutes(-2, 5), Duration::from_secs(300));
        assert_eq!(interval_minutes(i64::MAX, 5), Duration::from_secs(u64::MAX));
    }
}
